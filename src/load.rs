//! Input loading: salary and city-rule documents → store.
//!
//! Both files are JSON arrays of records (see [`SalaryRecord`] and
//! [`CityRule`]). Every row is validated before anything is written; the
//! two input tables are then overwritten together.

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;

use contrib_core::models::{CityRule, SalaryRecord};
use contrib_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Largest accepted salary amount or contribution-base bound (10^15).
const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Largest accepted contribution rate.
const MAX_RATE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Row counts written by a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub salaries: usize,
    pub cities: usize,
    pub employees: usize,
}

pub async fn run_load(
    config: &Config,
    salaries_path: &Path,
    cities_path: &Path,
    dry_run: bool,
) -> Result<()> {
    let salaries: Vec<SalaryRecord> = read_json(salaries_path)?;
    let cities: Vec<CityRule> = read_json(cities_path)?;

    if dry_run {
        let report = validate_inputs(&salaries, &cities)?;
        println!("load (dry-run)");
        println!("  salary rows: {}", report.salaries);
        println!("  employees: {}", report.employees);
        println!("  city rules: {}", report.cities);
        return Ok(());
    }

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let report = load_inputs(&store, &salaries, &cities).await?;
    store.close().await;

    println!("load");
    println!("  salary rows: {}", report.salaries);
    println!("  employees: {}", report.employees);
    println!("  city rules: {}", report.cities);
    println!("ok");
    Ok(())
}

/// Validate and overwrite the `salaries` and `cities` tables.
pub async fn load_inputs<S: Store + ?Sized>(
    store: &S,
    salaries: &[SalaryRecord],
    cities: &[CityRule],
) -> Result<LoadReport> {
    let report = validate_inputs(salaries, cities)?;
    store.replace_inputs(salaries, cities).await?;
    tracing::info!(
        salaries = report.salaries,
        cities = report.cities,
        employees = report.employees,
        "inputs loaded"
    );
    Ok(report)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Check every row. Fails on the first invalid row; duplicates only warn.
pub fn validate_inputs(salaries: &[SalaryRecord], cities: &[CityRule]) -> Result<LoadReport> {
    let mut seen_months: HashSet<(&str, &str)> = HashSet::new();
    let mut employees: HashSet<&str> = HashSet::new();

    for (i, s) in salaries.iter().enumerate() {
        if s.employee_name.trim().is_empty() {
            bail!("salaries[{}]: employee_name must not be empty", i);
        }
        if s.amount < Decimal::ZERO {
            bail!(
                "salaries[{}] ({}): amount must be >= 0, got {}",
                i,
                s.employee_name,
                s.amount
            );
        }
        if s.amount > MAX_AMOUNT {
            bail!(
                "salaries[{}] ({}): amount must be <= {}, got {}",
                i,
                s.employee_name,
                MAX_AMOUNT,
                s.amount
            );
        }
        if !seen_months.insert((s.employee_name.as_str(), s.month.as_str())) {
            tracing::warn!(
                employee = %s.employee_name,
                month = %s.month,
                "duplicate salary row; both rows count toward the average"
            );
        }
        employees.insert(s.employee_name.as_str());
    }

    let mut seen_rules: HashSet<(&str, &str)> = HashSet::new();
    for (i, c) in cities.iter().enumerate() {
        if c.city_name.trim().is_empty() {
            bail!("cities[{}]: city_name must not be empty", i);
        }
        if c.rate <= Decimal::ZERO {
            bail!("cities[{}] ({}): rate must be > 0, got {}", i, c.city_name, c.rate);
        }
        if c.rate > MAX_RATE {
            bail!(
                "cities[{}] ({}): rate must be <= {}, got {}",
                i,
                c.city_name,
                MAX_RATE,
                c.rate
            );
        }
        if c.base_min < Decimal::ZERO {
            bail!(
                "cities[{}] ({}): base_min must be >= 0, got {}",
                i,
                c.city_name,
                c.base_min
            );
        }
        if c.base_max < c.base_min {
            bail!(
                "cities[{}] ({}): base_max {} is below base_min {}",
                i,
                c.city_name,
                c.base_max,
                c.base_min
            );
        }
        if c.base_max > MAX_AMOUNT {
            bail!(
                "cities[{}] ({}): base_max must be <= {}, got {}",
                i,
                c.city_name,
                MAX_AMOUNT,
                c.base_max
            );
        }
        if !seen_rules.insert((c.city_name.as_str(), c.year.as_str())) {
            tracing::warn!(
                city = %c.city_name,
                year = %c.year,
                "duplicate city rule; each row produces its own results"
            );
        }
    }

    Ok(LoadReport {
        salaries: salaries.len(),
        cities: cities.len(),
        employees: employees.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contrib_core::store::memory::InMemoryStore;
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
    fn test_valid_inputs_report_counts() {
        let report = validate_inputs(
            &[
                salary("Alice", "2024-01", "8000"),
                salary("Alice", "2024-02", "9000"),
                salary("Bob", "2024-01", "3000"),
            ],
            &[city("Beijing", "0.16", "5000", "25000")],
        )
        .unwrap();
        assert_eq!(
            report,
            LoadReport {
                salaries: 3,
                cities: 1,
                employees: 2
            }
        );
    }

    #[test]
    fn test_zero_rate_rejected() {
        let err = validate_inputs(&[], &[city("Beijing", "0", "5000", "25000")]).unwrap_err();
        assert!(err.to_string().contains("cities[0]"));
        assert!(err.to_string().contains("rate"));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let err = validate_inputs(
            &[],
            &[
                city("Beijing", "0.16", "5000", "25000"),
                city("Shanghai", "0.14", "9000", "8000"),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("cities[1] (Shanghai)"));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = validate_inputs(&[salary("Alice", "2024-01", "-1")], &[]).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_bound_constants() {
        assert_eq!(MAX_AMOUNT, d("1000000000000000"));
        assert_eq!(MAX_RATE, d("100"));
    }

    #[test]
    fn test_oversized_values_rejected() {
        let err = validate_inputs(&[salary("Alice", "2024-01", "1000000000000000.01")], &[])
            .unwrap_err();
        assert!(err.to_string().contains("amount must be <="), "{}", err);

        let err = validate_inputs(&[], &[city("Beijing", "100.5", "5000", "25000")]).unwrap_err();
        assert!(err.to_string().contains("rate must be <="), "{}", err);

        let err = validate_inputs(
            &[],
            &[city("Beijing", "0.16", "5000", "79228162514264337593543950335")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("base_max must be <="), "{}", err);
    }

    #[test]
    fn test_values_at_bounds_accepted() {
        validate_inputs(
            &[salary("Alice", "2024-01", "1000000000000000")],
            &[city("Beijing", "100", "0", "1000000000000000")],
        )
        .unwrap();
    }

    #[test]
    fn test_blank_employee_rejected() {
        assert!(validate_inputs(&[salary("  ", "2024-01", "100")], &[]).is_err());
    }

    #[test]
    fn test_duplicates_are_accepted() {
        let report = validate_inputs(
            &[
                salary("Alice", "2024-01", "8000"),
                salary("Alice", "2024-01", "8000"),
            ],
            &[
                city("Beijing", "0.16", "5000", "25000"),
                city("Beijing", "0.16", "5000", "25000"),
            ],
        )
        .unwrap();
        assert_eq!(report.salaries, 2);
        assert_eq!(report.cities, 2);
    }

    #[tokio::test]
    async fn test_load_overwrites_previous_inputs() {
        let store = InMemoryStore::with_inputs(
            vec![salary("Old", "2023-12", "1")],
            vec![city("Old", "0.1", "0", "1")],
        );
        load_inputs(
            &store,
            &[salary("Alice", "2024-01", "8000")],
            &[city("Beijing", "0.16", "5000", "25000")],
        )
        .await
        .unwrap();

        let salaries = store.read_salaries().await.unwrap();
        let cities = store.read_cities().await.unwrap();
        assert_eq!(salaries.len(), 1);
        assert_eq!(salaries[0].employee_name, "Alice");
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].city_name, "Beijing");
    }

    #[tokio::test]
    async fn test_invalid_load_writes_nothing() {
        let store = InMemoryStore::with_inputs(vec![salary("Old", "2023-12", "1")], Vec::new());
        let err = load_inputs(
            &store,
            &[salary("Alice", "2024-01", "8000")],
            &[city("Beijing", "0.16", "9000", "100")],
        )
        .await;
        assert!(err.is_err());
        assert_eq!(store.read_salaries().await.unwrap()[0].employee_name, "Old");
    }
}
