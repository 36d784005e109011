//! Aggregate statistics over a result set.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calc::Rounding;
use crate::models::ContributionResult;

/// Per-city fee total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityTotal {
    pub city: String,
    /// Result rows for this city.
    pub count: usize,
    pub total_fee: Decimal,
}

/// Per-employee fee total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTotal {
    pub name: String,
    /// Result rows (city rules) for this employee.
    pub cities: usize,
    pub total_fee: Decimal,
}

/// Totals across the whole result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultStats {
    pub total_records: usize,
    pub unique_employees: usize,
    pub unique_cities: usize,
    pub total_company_fee: Decimal,
    /// Sorted by `total_fee` descending, then city name.
    pub city_stats: Vec<CityTotal>,
    /// Sorted by `total_fee` descending, then employee name.
    pub employee_stats: Vec<EmployeeTotal>,
}

/// Summarize `results`. Returns `None` for an empty set.
pub fn summarize(results: &[ContributionResult], rounding: Rounding) -> Option<ResultStats> {
    if results.is_empty() {
        return None;
    }

    let mut by_city: HashMap<&str, (usize, Decimal)> = HashMap::new();
    let mut by_employee: HashMap<&str, (usize, Decimal)> = HashMap::new();
    let mut total = Decimal::ZERO;

    for r in results {
        let c = by_city.entry(&r.city_name).or_insert((0, Decimal::ZERO));
        c.0 += 1;
        c.1 += r.company_fee;

        let e = by_employee
            .entry(&r.employee_name)
            .or_insert((0, Decimal::ZERO));
        e.0 += 1;
        e.1 += r.company_fee;

        total += r.company_fee;
    }

    let mut city_stats: Vec<CityTotal> = by_city
        .into_iter()
        .map(|(city, (count, fee))| CityTotal {
            city: city.to_string(),
            count,
            total_fee: rounding.round_money(fee),
        })
        .collect();
    city_stats.sort_by(|a, b| b.total_fee.cmp(&a.total_fee).then_with(|| a.city.cmp(&b.city)));

    let mut employee_stats: Vec<EmployeeTotal> = by_employee
        .into_iter()
        .map(|(name, (cities, fee))| EmployeeTotal {
            name: name.to_string(),
            cities,
            total_fee: rounding.round_money(fee),
        })
        .collect();
    employee_stats.sort_by(|a, b| b.total_fee.cmp(&a.total_fee).then_with(|| a.name.cmp(&b.name)));

    let unique_employees = results
        .iter()
        .map(|r| r.employee_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    Some(ResultStats {
        total_records: results.len(),
        unique_employees,
        unique_cities: city_stats.len(),
        total_company_fee: rounding.round_money(total),
        city_stats,
        employee_stats,
    })
}
