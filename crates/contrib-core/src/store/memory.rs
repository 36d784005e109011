//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Result replacement holds the
//! write lock across clear and insert, so readers never observe the
//! empty intermediate state.

use std::sync::{PoisonError, RwLock};

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CityRule, ContributionResult, RunSummary, SalaryRecord, Table};

use super::Store;

/// In-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    salaries: RwLock<Vec<SalaryRecord>>,
    cities: RwLock<Vec<CityRule>>,
    results: RwLock<Vec<ContributionResult>>,
    runs: RwLock<Vec<RunSummary>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with input rows.
    pub fn with_inputs(salaries: Vec<SalaryRecord>, cities: Vec<CityRule>) -> Self {
        Self {
            salaries: RwLock::new(salaries),
            cities: RwLock::new(cities),
            ..Self::default()
        }
    }

    /// Number of recorded runs.
    pub fn run_count(&self) -> usize {
        self.runs.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn append<T: Clone>(lock: &RwLock<Vec<T>>, rows: &[T]) -> u64 {
    let mut guard = lock.write().unwrap_or_else(PoisonError::into_inner);
    guard.extend_from_slice(rows);
    rows.len() as u64
}

fn snapshot<T: Clone>(lock: &RwLock<Vec<T>>) -> Vec<T> {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn clear<T>(lock: &RwLock<Vec<T>>) -> u64 {
    let mut guard = lock.write().unwrap_or_else(PoisonError::into_inner);
    let n = guard.len() as u64;
    guard.clear();
    n
}

#[async_trait]
impl Store for InMemoryStore {
    async fn read_salaries(&self) -> Result<Vec<SalaryRecord>> {
        Ok(snapshot(&self.salaries))
    }

    async fn read_cities(&self) -> Result<Vec<CityRule>> {
        Ok(snapshot(&self.cities))
    }

    async fn read_results(&self) -> Result<Vec<ContributionResult>> {
        Ok(snapshot(&self.results))
    }

    async fn delete_all(&self, table: Table) -> Result<u64> {
        Ok(match table {
            Table::Salaries => clear(&self.salaries),
            Table::Cities => clear(&self.cities),
            Table::Results => clear(&self.results),
        })
    }

    async fn insert_salaries(&self, rows: &[SalaryRecord]) -> Result<u64> {
        Ok(append(&self.salaries, rows))
    }

    async fn insert_cities(&self, rows: &[CityRule]) -> Result<u64> {
        Ok(append(&self.cities, rows))
    }

    async fn insert_results(&self, rows: &[ContributionResult]) -> Result<u64> {
        Ok(append(&self.results, rows))
    }

    async fn replace_results(&self, rows: &[ContributionResult]) -> Result<()> {
        let mut guard = self.results.write().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.extend_from_slice(rows);
        Ok(())
    }

    async fn record_run(&self, run: &RunSummary) -> Result<()> {
        append(&self.runs, std::slice::from_ref(run));
        Ok(())
    }

    async fn last_run(&self) -> Result<Option<RunSummary>> {
        Ok(self
            .runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned())
    }
}
