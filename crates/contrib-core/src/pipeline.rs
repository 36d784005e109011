//! One calculation run: read inputs, compute, replace results.
//!
//! The run operates entirely through the [`Store`] trait. The caller
//! constructs the store and passes it in; nothing here holds global state.
//!
//! Sequence: `read_salaries` → `read_cities` → [`compute_with`] →
//! `replace_results` → `record_run`. A [`CalcError`](crate::calc::CalcError)
//! aborts before anything is written, leaving prior results intact.

use anyhow::Result;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::calc::{compute_with, distinct_employees, CalcOptions};
use crate::models::{CityRule, ContributionResult, RunSummary, SalaryRecord};
use crate::store::Store;

/// Output of [`preview_calculation`].
#[derive(Debug, Clone)]
pub struct Preview {
    pub summary: RunSummary,
    pub results: Vec<ContributionResult>,
}

/// Read, compute, and replace the stored result set.
pub async fn run_calculation<S: Store + ?Sized>(store: &S, opts: &CalcOptions) -> Result<RunSummary> {
    let Preview { summary, results } = preview_calculation(store, opts).await?;

    store.replace_results(&results).await?;
    store.record_run(&summary).await?;

    tracing::info!(
        run_id = %summary.run_id,
        employees = summary.employees,
        cities = summary.city_rows,
        results = summary.results,
        "calculation run complete"
    );
    Ok(summary)
}

/// Read and compute without writing anything.
pub async fn preview_calculation<S: Store + ?Sized>(store: &S, opts: &CalcOptions) -> Result<Preview> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4().to_string();

    let salaries = store.read_salaries().await?;
    let cities = store.read_cities().await?;
    tracing::debug!(
        %run_id,
        salary_rows = salaries.len(),
        city_rows = cities.len(),
        rounding = %opts.rounding,
        "inputs read"
    );

    let results = compute_with(&salaries, &cities, opts)?;

    let summary = RunSummary {
        run_id,
        started_at,
        salary_rows: salaries.len(),
        city_rows: cities.len(),
        employees: distinct_employees(&salaries),
        results: results.len(),
        input_hash: input_hash(&salaries, &cities),
    };
    Ok(Preview { summary, results })
}

/// SHA-256 fingerprint of the input rows, in the order given.
pub fn input_hash(salaries: &[SalaryRecord], cities: &[CityRule]) -> String {
    let mut hasher = Sha256::new();
    for s in salaries {
        hasher.update(b"S\x1f");
        hasher.update(s.employee_name.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(s.month.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(s.amount.normalize().to_string().as_bytes());
        hasher.update(b"\x1e");
    }
    for c in cities {
        hasher.update(b"C\x1f");
        hasher.update(c.city_name.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(c.year.as_bytes());
        for v in [c.rate, c.base_min, c.base_max] {
            hasher.update(b"\x1f");
            hasher.update(v.normalize().to_string().as_bytes());
        }
        hasher.update(b"\x1e");
    }
    format!("{:x}", hasher.finalize())
}
