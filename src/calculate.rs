//! `contrib calculate`: one read → compute → replace run against SQLite.

use anyhow::Result;

use contrib_core::pipeline::{preview_calculation, run_calculation};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

pub async fn run_calculate(config: &Config, dry_run: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let opts = config.calculation.options();

    let summary = if dry_run {
        preview_calculation(&store, &opts).await.map(|p| p.summary)
    } else {
        run_calculation(&store, &opts).await
    };
    store.close().await;
    let summary = summary?;

    if dry_run {
        println!("calculate (dry-run)");
    } else {
        println!("calculate");
    }
    println!("  run: {}", summary.run_id);
    println!("  salary rows: {}", summary.salary_rows);
    println!("  employees: {}", summary.employees);
    println!("  city rules: {}", summary.city_rows);
    println!("  rounding: {}", opts.rounding);
    if dry_run {
        println!("  results (not written): {}", summary.results);
    } else {
        println!("  results written: {}", summary.results);
        println!("ok");
    }
    Ok(())
}
