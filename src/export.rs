//! Export the stored results as JSON.
//!
//! Produces one document holding the (optionally filtered) result rows and
//! their statistics, suitable for spreadsheets or downstream reporting.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use contrib_core::models::{ContributionResult, RunSummary};
use contrib_core::query::ResultFilter;
use contrib_core::store::Store;
use contrib_core::summary::{summarize, ResultStats};

use crate::config::Config;
use crate::db;
use crate::results::fetch_results;
use crate::sqlite_store::SqliteStore;

#[derive(Serialize)]
struct ExportData {
    exported_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    employee_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city_filter: Option<String>,
    last_run: Option<RunSummary>,
    stats: Option<ResultStats>,
    results: Vec<ContributionResult>,
}

/// Export results as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, filter: &ResultFilter, output: Option<&Path>) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let gathered = async {
        let results = fetch_results(&store, filter).await?;
        let last_run = store.last_run().await?;
        anyhow::Ok((results, last_run))
    }
    .await;
    store.close().await;
    let (results, last_run) = gathered?;

    let count = results.len();
    let data = ExportData {
        exported_at: chrono::Utc::now().to_rfc3339(),
        employee_filter: filter.employee.clone(),
        city_filter: filter.city.clone(),
        last_run,
        stats: summarize(&results, config.calculation.rounding),
        results,
    };
    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported {} results to {}", count, path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
