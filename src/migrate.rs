//! Database schema migrations (idempotent).
//!
//! Money and rate columns are `TEXT` holding exact decimal strings, so
//! values round-trip through the database without float drift.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create every table and index on an open pool.
pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id TEXT,
            employee_name TEXT NOT NULL,
            month TEXT NOT NULL,
            amount TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city_name TEXT NOT NULL,
            year TEXT NOT NULL,
            rate TEXT NOT NULL,
            base_min TEXT NOT NULL,
            base_max TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_name TEXT NOT NULL,
            city_name TEXT NOT NULL,
            year TEXT NOT NULL,
            avg_salary TEXT NOT NULL,
            contribution_base TEXT NOT NULL,
            company_fee TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS calc_runs (
            run_id TEXT PRIMARY KEY,
            started_at INTEGER NOT NULL,
            salary_rows INTEGER NOT NULL,
            city_rows INTEGER NOT NULL,
            employees INTEGER NOT NULL,
            results INTEGER NOT NULL,
            input_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_salaries_employee ON salaries(employee_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_results_employee ON results(employee_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_results_city ON results(city_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_calc_runs_started ON calc_runs(started_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
