//! Data models shared by the calculator, the store, and the CLI.
//!
//! Money and rate values are [`Decimal`] so that two-decimal rounding is
//! exact. Records serialize with amounts as strings (`"8500.00"`) and
//! deserialize from either JSON numbers or strings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// One employee's salary for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// Employee number from the payroll sheet. Informational only; records
    /// are grouped by `employee_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub employee_name: String,
    /// Period label, e.g. `"2024-01"` or `202401`.
    #[serde(deserialize_with = "string_or_number")]
    pub month: String,
    #[serde(alias = "salary_amount")]
    pub amount: Decimal,
}

/// A city's contribution rule for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRule {
    /// Also read from the `city_namte ` header (sic, trailing space) that
    /// the city-rule sheets carry.
    #[serde(alias = "city_namte ")]
    pub city_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub year: String,
    /// Employer contribution rate, e.g. `0.16`.
    pub rate: Decimal,
    /// Lower bound of the contribution base.
    pub base_min: Decimal,
    /// Upper bound of the contribution base.
    pub base_max: Decimal,
}

/// The employer's contribution for one employee in one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub employee_name: String,
    pub city_name: String,
    pub year: String,
    pub avg_salary: Decimal,
    pub contribution_base: Decimal,
    pub company_fee: Decimal,
}

/// Bookkeeping for one calculation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run UUID.
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub salary_rows: usize,
    pub city_rows: usize,
    /// Distinct employee names among the salary rows.
    pub employees: usize,
    /// Result rows written.
    pub results: usize,
    /// SHA-256 over the salary and city rows as read, hex encoded.
    pub input_hash: String,
}

/// Logical tables of the store contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Salaries,
    Cities,
    Results,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Salaries => "salaries",
            Table::Cities => "cities",
            Table::Results => "results",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

/// Accepts `"2024"`, `2024` or `2024.0` and yields `"2024"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(s) => s,
        StringOrNumber::Int(n) => n.to_string(),
        StringOrNumber::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_salary_accepts_numeric_month_and_legacy_amount_key() {
        let rec: SalaryRecord = serde_json::from_str(
            r#"{"employee_id": "E01", "employee_name": "Alice", "month": 202401, "salary_amount": 8000}"#,
        )
        .unwrap();
        assert_eq!(rec.month, "202401");
        assert_eq!(rec.amount, Decimal::from(8000));
        assert_eq!(rec.employee_id.as_deref(), Some("E01"));
    }

    #[test]
    fn test_city_rule_decimal_from_float_is_exact() {
        let rule: CityRule = serde_json::from_str(
            r#"{"city_name": "Beijing", "year": 2024, "rate": 0.16, "base_min": 5000, "base_max": 25000}"#,
        )
        .unwrap();
        assert_eq!(rule.year, "2024");
        assert_eq!(rule.rate, Decimal::from_str("0.16").unwrap());
    }

    #[test]
    fn test_city_rule_accepts_string_amounts() {
        let rule: CityRule = serde_json::from_str(
            r#"{"city_name": "Shanghai", "year": "2024", "rate": "0.14", "base_min": "7310", "base_max": "36549"}"#,
        )
        .unwrap();
        assert_eq!(rule.base_max, Decimal::from(36549));
    }

    #[test]
    fn test_city_rule_accepts_misspelled_sheet_header() {
        let rule: CityRule = serde_json::from_str(
            r#"{"city_namte ": "Hangzhou", "year": 2024, "rate": 0.14, "base_min": 4462, "base_max": 22311}"#,
        )
        .unwrap();
        assert_eq!(rule.city_name, "Hangzhou");
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Salaries.to_string(), "salaries");
        assert_eq!(Table::Cities.name(), "cities");
        assert_eq!(Table::Results.name(), "results");
    }
}
