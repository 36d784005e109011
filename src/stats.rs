//! Result statistics and last-run overview.
//!
//! Prints record counts, fee totals, and per-city / per-employee
//! breakdowns of the stored result set, plus when the last calculation ran.

use anyhow::Result;
use serde::Serialize;

use contrib_core::models::RunSummary;
use contrib_core::store::Store;
use contrib_core::summary::{summarize, ResultStats};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Stats payload shared by `contrib stats --json` and `contrib export`.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub stats: Option<ResultStats>,
    pub last_run: Option<RunSummary>,
}

pub async fn collect_stats<S: Store + ?Sized>(store: &S, config: &Config) -> Result<StatsReport> {
    let results = store.read_results().await?;
    let stats = summarize(&results, config.calculation.rounding);
    let last_run = store.last_run().await?;
    Ok(StatsReport { stats, last_run })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let report = collect_stats(&store, config).await;
    store.close().await;
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Contribution Stats");
    println!("==================");
    println!();
    println!("  Database:    {}", config.db.path.display());

    match &report.last_run {
        Some(run) => println!(
            "  Last run:    {} ({})",
            format_ts_relative(run.started_at.timestamp()),
            run.run_id
        ),
        None => println!("  Last run:    never"),
    }
    println!();

    let Some(stats) = report.stats else {
        println!("  No results. Run `contrib calculate` first.");
        println!();
        return Ok(());
    };

    println!("  Records:     {}", stats.total_records);
    println!("  Employees:   {}", stats.unique_employees);
    println!("  Cities:      {}", stats.unique_cities);
    println!("  Total fee:   {:.2}", stats.total_company_fee);

    println!();
    println!("  By city:");
    println!("  {:<24} {:>8} {:>14}", "CITY", "RECORDS", "TOTAL FEE");
    println!("  {}", "-".repeat(48));
    for c in &stats.city_stats {
        println!("  {:<24} {:>8} {:>14.2}", c.city, c.count, c.total_fee);
    }

    println!();
    println!("  By employee:");
    println!("  {:<24} {:>8} {:>14}", "EMPLOYEE", "CITIES", "TOTAL FEE");
    println!("  {}", "-".repeat(48));
    for e in &stats.employee_stats {
        println!("  {:<24} {:>8} {:>14.2}", e.name, e.cities, e.total_fee);
    }
    println!();

    Ok(())
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
