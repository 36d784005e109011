//! Employer contribution calculation.
//!
//! # Algorithm
//!
//! 1. Group salary records by `employee_name`.
//! 2. Average each group's amounts and round to 2 decimal places.
//! 3. For every employee × every city rule, clamp the average into
//!    `[base_min, base_max]` to get the contribution base.
//! 4. `company_fee = contribution_base × rate`, rounded to 2 decimal places.
//!
//! The same [`Rounding`] mode is applied to the average and to the fee.
//! Employees are emitted in the order their first salary row appears.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{CityRule, ContributionResult, SalaryRecord};

/// Failures of [`compute`]. The two missing-data variants are recoverable
/// by loading input data and running again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("no salary data: load salaries before calculating")]
    NoSalaryData,
    #[error("no city data: load city rules before calculating")]
    NoCityData,
    /// A salary sum or fee does not fit in a `Decimal`.
    #[error("arithmetic overflow: salary or contribution values are too large")]
    Overflow,
}

/// Midpoint rule used when rounding to 2 decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Round half away from zero: `0.125 -> 0.13`, `-0.125 -> -0.13`.
    #[default]
    HalfUp,
    /// Banker's rounding: `0.125 -> 0.12`, `0.135 -> 0.14`.
    HalfEven,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Rounding::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Round `value` to 2 decimal places, always carrying scale 2.
    pub fn round_money(self, value: Decimal) -> Decimal {
        let mut rounded = value.round_dp_with_strategy(2, self.strategy());
        rounded.rescale(2);
        rounded
    }
}

impl std::fmt::Display for Rounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rounding::HalfUp => f.write_str("half_up"),
            Rounding::HalfEven => f.write_str("half_even"),
        }
    }
}

/// Calculation tuning, decoupled from application config.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalcOptions {
    pub rounding: Rounding,
}

/// One employee's rounded average monthly salary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeAverage {
    pub employee_name: String,
    pub avg_salary: Decimal,
    /// Number of salary rows averaged.
    pub months: usize,
}

/// Compute contributions with the default options (half-up rounding).
pub fn compute(
    salaries: &[SalaryRecord],
    cities: &[CityRule],
) -> Result<Vec<ContributionResult>, CalcError> {
    compute_with(salaries, cities, &CalcOptions::default())
}

/// Compute one [`ContributionResult`] per (employee, city rule) pair.
///
/// Fails with [`CalcError::NoSalaryData`] when `salaries` is empty and
/// with [`CalcError::NoCityData`] when `cities` is empty, checked in that
/// order. Groups are never empty, so the mean is always defined; sums and
/// products that exceed `Decimal` range fail with [`CalcError::Overflow`].
pub fn compute_with(
    salaries: &[SalaryRecord],
    cities: &[CityRule],
    opts: &CalcOptions,
) -> Result<Vec<ContributionResult>, CalcError> {
    if salaries.is_empty() {
        return Err(CalcError::NoSalaryData);
    }
    if cities.is_empty() {
        return Err(CalcError::NoCityData);
    }

    let averages = average_salaries(salaries, opts.rounding)?;
    let mut results = Vec::with_capacity(averages.len() * cities.len());

    for emp in &averages {
        for city in cities {
            let contribution_base = contribution_base(emp.avg_salary, city.base_min, city.base_max);
            let company_fee = contribution_base
                .checked_mul(city.rate)
                .map(|fee| opts.rounding.round_money(fee))
                .ok_or(CalcError::Overflow)?;
            results.push(ContributionResult {
                employee_name: emp.employee_name.clone(),
                city_name: city.city_name.clone(),
                year: city.year.clone(),
                avg_salary: emp.avg_salary,
                contribution_base,
                company_fee,
            });
        }
    }

    Ok(results)
}

/// Group salaries by employee name and average each group.
pub fn average_salaries(
    salaries: &[SalaryRecord],
    rounding: Rounding,
) -> Result<Vec<EmployeeAverage>, CalcError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Decimal, usize)> = Vec::new();

    for rec in salaries {
        match index.get(rec.employee_name.as_str()) {
            Some(&i) => {
                groups[i].1 = groups[i].1.checked_add(rec.amount).ok_or(CalcError::Overflow)?;
                groups[i].2 += 1;
            }
            None => {
                index.insert(rec.employee_name.as_str(), groups.len());
                groups.push((rec.employee_name.as_str(), rec.amount, 1));
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(name, sum, count)| EmployeeAverage {
            employee_name: name.to_string(),
            avg_salary: rounding.round_money(sum / Decimal::from(count)),
            months: count,
        })
        .collect())
}

/// Clamp an average salary into a city's contribution-base band.
///
/// The low bound is tested first, so a malformed band (`max < min`)
/// yields `min` for low averages instead of panicking like `Ord::clamp`.
pub fn contribution_base(avg_salary: Decimal, base_min: Decimal, base_max: Decimal) -> Decimal {
    if avg_salary < base_min {
        base_min
    } else if avg_salary > base_max {
        base_max
    } else {
        avg_salary
    }
}

/// Number of distinct employee names among `salaries`.
pub fn distinct_employees(salaries: &[SalaryRecord]) -> usize {
    salaries
        .iter()
        .map(|s| s.employee_name.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn salary(name: &str, month: &str, amount: &str) -> SalaryRecord {
        SalaryRecord {
            employee_id: None,
            employee_name: name.to_string(),
            month: month.to_string(),
            amount: d(amount),
        }
    }

    fn city(name: &str, rate: &str, min: &str, max: &str) -> CityRule {
        CityRule {
            city_name: name.to_string(),
            year: "2024".to_string(),
            rate: d(rate),
            base_min: d(min),
            base_max: d(max),
        }
    }

    #[test]
    fn test_alice_beijing_example() {
        let salaries = vec![
            salary("Alice", "2024-01", "8000"),
            salary("Alice", "2024-02", "9000"),
        ];
        let cities = vec![city("Beijing", "0.16", "5000", "25000")];

        let results = compute(&salaries, &cities).unwrap();
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.employee_name, "Alice");
        assert_eq!(r.city_name, "Beijing");
        assert_eq!(r.year, "2024");
        assert_eq!(r.avg_salary, d("8500.00"));
        assert_eq!(r.contribution_base, d("8500.00"));
        assert_eq!(r.company_fee, d("1360.00"));
        assert_eq!(r.company_fee.to_string(), "1360.00");
    }

    #[test]
    fn test_clamp_low() {
        let results = compute(
            &[salary("Bob", "2024-01", "3000")],
            &[city("Beijing", "0.16", "5000", "25000")],
        )
        .unwrap();
        assert_eq!(results[0].avg_salary, d("3000"));
        assert_eq!(results[0].contribution_base, d("5000"));
        assert_eq!(results[0].company_fee, d("800.00"));
    }

    #[test]
    fn test_clamp_high() {
        let results = compute(
            &[salary("Carol", "2024-01", "30000")],
            &[city("Beijing", "0.16", "5000", "25000")],
        )
        .unwrap();
        assert_eq!(results[0].contribution_base, d("25000"));
        assert_eq!(results[0].company_fee, d("4000.00"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let cities = vec![city("X", "0.1", "5000", "25000")];
        let at_min = compute(&[salary("A", "1", "5000")], &cities).unwrap();
        let at_max = compute(&[salary("B", "1", "25000")], &cities).unwrap();
        assert_eq!(at_min[0].contribution_base, d("5000"));
        assert_eq!(at_max[0].contribution_base, d("25000"));
    }

    #[test]
    fn test_empty_salaries() {
        let err = compute(&[], &[city("Beijing", "0.16", "5000", "25000")]).unwrap_err();
        assert_eq!(err, CalcError::NoSalaryData);
    }

    #[test]
    fn test_empty_cities() {
        let err = compute(&[salary("Alice", "2024-01", "8000")], &[]).unwrap_err();
        assert_eq!(err, CalcError::NoCityData);
    }

    #[test]
    fn test_both_empty_reports_salaries_first() {
        assert_eq!(compute(&[], &[]).unwrap_err(), CalcError::NoSalaryData);
    }

    #[test]
    fn test_cross_product_size_and_clamp_invariant() {
        let salaries = vec![
            salary("Alice", "2024-01", "8000"),
            salary("Bob", "2024-01", "2000"),
            salary("Alice", "2024-02", "9000"),
            salary("Dan", "2024-01", "41000"),
            salary("Bob", "2024-02", "2500"),
        ];
        let cities = vec![
            city("Beijing", "0.16", "5000", "25000"),
            city("Shanghai", "0.14", "7310", "36549"),
            city("Shenzhen", "0.15", "2360", "27927"),
        ];

        let results = compute(&salaries, &cities).unwrap();
        assert_eq!(results.len(), distinct_employees(&salaries) * cities.len());
        assert_eq!(results.len(), 9);

        for r in &results {
            let rule = cities.iter().find(|c| c.city_name == r.city_name).unwrap();
            assert!(
                r.contribution_base >= rule.base_min && r.contribution_base <= rule.base_max,
                "base {} outside [{}, {}]",
                r.contribution_base,
                rule.base_min,
                rule.base_max
            );
        }
    }

    #[test]
    fn test_employees_in_first_appearance_order() {
        let salaries = vec![
            salary("Zed", "1", "1000"),
            salary("Amy", "1", "1000"),
            salary("Zed", "2", "1000"),
        ];
        let results = compute(&salaries, &[city("X", "0.1", "0", "99999")]).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.employee_name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Amy"]);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let salaries = vec![
            salary("Alice", "2024-01", "8123.45"),
            salary("Alice", "2024-02", "9876.54"),
            salary("Bob", "2024-01", "4321"),
        ];
        let cities = vec![
            city("Beijing", "0.16", "5000", "25000"),
            city("Hangzhou", "0.14", "4462", "22311"),
        ];
        assert_eq!(
            compute(&salaries, &cities).unwrap(),
            compute(&salaries, &cities).unwrap()
        );
    }

    #[test]
    fn test_average_rounds_half_up_by_default() {
        // (1000.00 + 1000.01) / 2 = 1000.005
        let salaries = vec![salary("A", "1", "1000.00"), salary("A", "2", "1000.01")];
        let avgs = average_salaries(&salaries, Rounding::HalfUp).unwrap();
        assert_eq!(avgs[0].avg_salary, d("1000.01"));
        assert_eq!(avgs[0].months, 2);

        let avgs = average_salaries(&salaries, Rounding::HalfEven).unwrap();
        assert_eq!(avgs[0].avg_salary, d("1000.00"));
    }

    #[test]
    fn test_fee_rounding_mode_applies_to_fee() {
        // 5000.25 * 0.1 = 500.025
        let salaries = vec![salary("A", "1", "5000.25")];
        let cities = vec![city("X", "0.1", "0", "99999")];

        let up = compute_with(&salaries, &cities, &CalcOptions { rounding: Rounding::HalfUp }).unwrap();
        let even =
            compute_with(&salaries, &cities, &CalcOptions { rounding: Rounding::HalfEven }).unwrap();
        assert_eq!(up[0].company_fee, d("500.03"));
        assert_eq!(even[0].company_fee, d("500.02"));
    }

    #[test]
    fn test_repeating_average() {
        // 10000 / 3 = 3333.333...
        let salaries = vec![
            salary("A", "1", "3000"),
            salary("A", "2", "3000"),
            salary("A", "3", "4000"),
        ];
        let results = compute(&salaries, &[city("X", "0.16", "0", "99999")]).unwrap();
        assert_eq!(results[0].avg_salary, d("3333.33"));
        // base keeps the already-rounded average; 3333.33 * 0.16 = 533.3328
        assert_eq!(results[0].contribution_base, d("3333.33"));
        assert_eq!(results[0].company_fee, d("533.33"));
    }

    #[test]
    fn test_duplicate_city_rows_each_produce_a_result() {
        let salaries = vec![salary("Alice", "2024-01", "8000")];
        let mut older = city("Beijing", "0.16", "4000", "20000");
        older.year = "2023".to_string();
        let cities = vec![older, city("Beijing", "0.16", "5000", "25000")];

        let results = compute(&salaries, &cities).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].year, "2023");
        assert_eq!(results[1].year, "2024");
    }

    #[test]
    fn test_malformed_band_does_not_panic() {
        assert_eq!(contribution_base(d("100"), d("500"), d("400")), d("500"));
        assert_eq!(contribution_base(d("450"), d("500"), d("400")), d("500"));
        assert_eq!(contribution_base(d("900"), d("500"), d("400")), d("400"));
    }

    #[test]
    fn test_salary_sum_overflow_is_an_error() {
        let salaries = vec![
            salary("A", "1", "50000000000000000000000000000"),
            salary("A", "2", "50000000000000000000000000000"),
        ];
        let cities = vec![CityRule {
            base_max: Decimal::MAX,
            ..city("X", "0.16", "0", "0")
        }];
        assert_eq!(compute(&salaries, &cities).unwrap_err(), CalcError::Overflow);
    }

    #[test]
    fn test_fee_overflow_is_an_error() {
        let salaries = vec![salary("A", "1", "70000000000000000000000000000")];
        let cities = vec![CityRule {
            base_max: Decimal::MAX,
            ..city("X", "2", "0", "0")
        }];
        assert_eq!(compute(&salaries, &cities).unwrap_err(), CalcError::Overflow);
    }

    #[test]
    fn test_round_money_carries_two_decimals() {
        assert_eq!(Rounding::HalfUp.round_money(d("8500")).to_string(), "8500.00");
        assert_eq!(Rounding::HalfUp.round_money(d("0.125")).to_string(), "0.13");
        assert_eq!(Rounding::HalfEven.round_money(d("0.125")).to_string(), "0.12");
    }
}
