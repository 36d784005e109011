//! SQLite-backed [`Store`] implementation.
//!
//! Bulk inserts and both replace operations run inside a single
//! transaction, so a failed write leaves the previous rows in place and
//! readers never observe a half-replaced table.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::str::FromStr;

use contrib_core::models::{CityRule, ContributionResult, RunSummary, SalaryRecord, Table};
use contrib_core::store::Store;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn decimal(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let raw: String = row.get(column);
    Decimal::from_str(&raw).with_context(|| format!("invalid decimal in column {}: '{}'", column, raw))
}

async fn insert_salary_rows(conn: &mut SqliteConnection, rows: &[SalaryRecord]) -> Result<u64> {
    for s in rows {
        sqlx::query(
            "INSERT INTO salaries (employee_id, employee_name, month, amount) VALUES (?, ?, ?, ?)",
        )
        .bind(&s.employee_id)
        .bind(&s.employee_name)
        .bind(&s.month)
        .bind(s.amount.to_string())
        .execute(&mut *conn)
        .await?;
    }
    Ok(rows.len() as u64)
}

async fn insert_city_rows(conn: &mut SqliteConnection, rows: &[CityRule]) -> Result<u64> {
    for c in rows {
        sqlx::query(
            "INSERT INTO cities (city_name, year, rate, base_min, base_max) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&c.city_name)
        .bind(&c.year)
        .bind(c.rate.to_string())
        .bind(c.base_min.to_string())
        .bind(c.base_max.to_string())
        .execute(&mut *conn)
        .await?;
    }
    Ok(rows.len() as u64)
}

async fn insert_result_rows(conn: &mut SqliteConnection, rows: &[ContributionResult]) -> Result<u64> {
    for r in rows {
        sqlx::query(
            r#"
            INSERT INTO results (employee_name, city_name, year, avg_salary, contribution_base, company_fee)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&r.employee_name)
        .bind(&r.city_name)
        .bind(&r.year)
        .bind(r.avg_salary.to_string())
        .bind(r.contribution_base.to_string())
        .bind(r.company_fee.to_string())
        .execute(&mut *conn)
        .await?;
    }
    Ok(rows.len() as u64)
}

async fn delete_table(conn: &mut SqliteConnection, table: Table) -> Result<u64> {
    // Table names come from a closed enum, never from input.
    let sql = format!("DELETE FROM {}", table.name());
    let done = sqlx::query(&sql).execute(&mut *conn).await?;
    Ok(done.rows_affected())
}

#[async_trait]
impl Store for SqliteStore {
    async fn read_salaries(&self) -> Result<Vec<SalaryRecord>> {
        let rows = sqlx::query(
            "SELECT employee_id, employee_name, month, amount FROM salaries ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to read salaries")?;

        rows.iter()
            .map(|row| {
                Ok(SalaryRecord {
                    employee_id: row.get("employee_id"),
                    employee_name: row.get("employee_name"),
                    month: row.get("month"),
                    amount: decimal(row, "amount")?,
                })
            })
            .collect()
    }

    async fn read_cities(&self) -> Result<Vec<CityRule>> {
        let rows = sqlx::query(
            "SELECT city_name, year, rate, base_min, base_max FROM cities ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to read cities")?;

        rows.iter()
            .map(|row| {
                Ok(CityRule {
                    city_name: row.get("city_name"),
                    year: row.get("year"),
                    rate: decimal(row, "rate")?,
                    base_min: decimal(row, "base_min")?,
                    base_max: decimal(row, "base_max")?,
                })
            })
            .collect()
    }

    async fn read_results(&self) -> Result<Vec<ContributionResult>> {
        let rows = sqlx::query(
            "SELECT employee_name, city_name, year, avg_salary, contribution_base, company_fee \
             FROM results ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to read results")?;

        rows.iter()
            .map(|row| {
                Ok(ContributionResult {
                    employee_name: row.get("employee_name"),
                    city_name: row.get("city_name"),
                    year: row.get("year"),
                    avg_salary: decimal(row, "avg_salary")?,
                    contribution_base: decimal(row, "contribution_base")?,
                    company_fee: decimal(row, "company_fee")?,
                })
            })
            .collect()
    }

    async fn delete_all(&self, table: Table) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        delete_table(&mut conn, table)
            .await
            .with_context(|| format!("Failed to clear {}", table))
    }

    async fn insert_salaries(&self, rows: &[SalaryRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let n = insert_salary_rows(&mut tx, rows)
            .await
            .context("Failed to insert salaries")?;
        tx.commit().await?;
        Ok(n)
    }

    async fn insert_cities(&self, rows: &[CityRule]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let n = insert_city_rows(&mut tx, rows)
            .await
            .context("Failed to insert cities")?;
        tx.commit().await?;
        Ok(n)
    }

    async fn insert_results(&self, rows: &[ContributionResult]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let n = insert_result_rows(&mut tx, rows)
            .await
            .context("Failed to insert results")?;
        tx.commit().await?;
        Ok(n)
    }

    async fn replace_results(&self, rows: &[ContributionResult]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let removed = delete_table(&mut tx, Table::Results)
            .await
            .context("Failed to clear results")?;
        insert_result_rows(&mut tx, rows)
            .await
            .context("Failed to insert results")?;
        tx.commit().await?;
        tracing::debug!(removed, inserted = rows.len(), "results replaced");
        Ok(())
    }

    async fn replace_inputs(&self, salaries: &[SalaryRecord], cities: &[CityRule]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        delete_table(&mut tx, Table::Cities)
            .await
            .context("Failed to clear cities")?;
        delete_table(&mut tx, Table::Salaries)
            .await
            .context("Failed to clear salaries")?;
        insert_city_rows(&mut tx, cities)
            .await
            .context("Failed to insert cities")?;
        insert_salary_rows(&mut tx, salaries)
            .await
            .context("Failed to insert salaries")?;
        tx.commit().await?;
        Ok(())
    }

    async fn record_run(&self, run: &RunSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO calc_runs (run_id, started_at, salary_rows, city_rows, employees, results, input_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&run.run_id)
        .bind(run.started_at.timestamp_millis())
        .bind(run.salary_rows as i64)
        .bind(run.city_rows as i64)
        .bind(run.employees as i64)
        .bind(run.results as i64)
        .bind(&run.input_hash)
        .execute(&self.pool)
        .await
        .context("Failed to record run")?;
        Ok(())
    }

    async fn last_run(&self) -> Result<Option<RunSummary>> {
        let row = sqlx::query(
            "SELECT run_id, started_at, salary_rows, city_rows, employees, results, input_hash \
             FROM calc_runs ORDER BY started_at DESC, rowid DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let started_ms: i64 = row.get("started_at");
        let started_at = chrono::DateTime::from_timestamp_millis(started_ms)
            .with_context(|| format!("invalid run timestamp: {}", started_ms))?;

        Ok(Some(RunSummary {
            run_id: row.get("run_id"),
            started_at,
            salary_rows: row.get::<i64, _>("salary_rows") as usize,
            city_rows: row.get::<i64, _>("city_rows") as usize,
            employees: row.get::<i64, _>("employees") as usize,
            results: row.get::<i64, _>("results") as usize,
            input_hash: row.get("input_hash"),
        }))
    }
}
