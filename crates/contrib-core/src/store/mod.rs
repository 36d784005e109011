//! Storage abstraction for the contribution calculator.
//!
//! The [`Store`] trait is the calculator's entire boundary with
//! persistence: read-all, delete-all, and bulk-insert per [`Table`], plus a
//! replace operation for the result set and a small run log.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CityRule, ContributionResult, RunSummary, SalaryRecord, Table};

/// Abstract storage backend.
///
/// All operations are async (via `async-trait`). In-memory implementations
/// return immediately-ready futures.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`read_salaries`](Store::read_salaries) | Read every salary row |
/// | [`read_cities`](Store::read_cities) | Read every city rule |
/// | [`read_results`](Store::read_results) | Read every result row |
/// | [`delete_all`](Store::delete_all) | Remove every row of a table |
/// | [`insert_salaries`](Store::insert_salaries) | Bulk-append salary rows |
/// | [`insert_cities`](Store::insert_cities) | Bulk-append city rules |
/// | [`insert_results`](Store::insert_results) | Bulk-append result rows |
/// | [`replace_results`](Store::replace_results) | Swap the whole result set |
/// | [`replace_inputs`](Store::replace_inputs) | Overwrite both input tables |
/// | [`record_run`](Store::record_run) | Append to the run log |
/// | [`last_run`](Store::last_run) | Most recent run log entry |
#[async_trait]
pub trait Store: Send + Sync {
    async fn read_salaries(&self) -> Result<Vec<SalaryRecord>>;

    async fn read_cities(&self) -> Result<Vec<CityRule>>;

    async fn read_results(&self) -> Result<Vec<ContributionResult>>;

    /// Remove every row of `table`, returning the number removed.
    async fn delete_all(&self, table: Table) -> Result<u64>;

    async fn insert_salaries(&self, rows: &[SalaryRecord]) -> Result<u64>;

    async fn insert_cities(&self, rows: &[CityRule]) -> Result<u64>;

    async fn insert_results(&self, rows: &[ContributionResult]) -> Result<u64>;

    /// Replace the stored result set with `rows`.
    ///
    /// The default clears then inserts as two steps, so a concurrent reader
    /// may briefly see an empty table. Backends that can swap atomically
    /// should override this.
    async fn replace_results(&self, rows: &[ContributionResult]) -> Result<()> {
        self.delete_all(Table::Results).await?;
        self.insert_results(rows).await?;
        Ok(())
    }

    /// Overwrite the `salaries` and `cities` tables.
    async fn replace_inputs(&self, salaries: &[SalaryRecord], cities: &[CityRule]) -> Result<()> {
        self.delete_all(Table::Cities).await?;
        self.delete_all(Table::Salaries).await?;
        self.insert_cities(cities).await?;
        self.insert_salaries(salaries).await?;
        Ok(())
    }

    async fn record_run(&self, run: &RunSummary) -> Result<()>;

    async fn last_run(&self) -> Result<Option<RunSummary>>;
}
