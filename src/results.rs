//! `contrib results`: list stored results, optionally filtered.

use anyhow::Result;

use contrib_core::models::ContributionResult;
use contrib_core::query::ResultFilter;
use contrib_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Read all results from the store and apply `filter`.
pub async fn fetch_results<S: Store + ?Sized>(
    store: &S,
    filter: &ResultFilter,
) -> Result<Vec<ContributionResult>> {
    let rows = store.read_results().await?;
    Ok(filter.apply(rows))
}

pub async fn run_results(config: &Config, filter: &ResultFilter, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let rows = fetch_results(&store, filter).await;
    store.close().await;
    let rows = rows?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!(
        "{:<20} {:<14} {:<6} {:>12} {:>12} {:>12}",
        "EMPLOYEE", "CITY", "YEAR", "AVG SALARY", "BASE", "COMPANY FEE"
    );
    println!("{}", "-".repeat(81));
    for r in &rows {
        println!(
            "{:<20} {:<14} {:<6} {:>12.2} {:>12.2} {:>12.2}",
            r.employee_name, r.city_name, r.year, r.avg_salary, r.contribution_base, r.company_fee
        );
    }
    println!();
    println!("{} result(s)", rows.len());
    Ok(())
}
