//! # Contribution Core
//!
//! Shared logic for the contribution calculator: data models, the pure
//! calculation, the store abstraction, the run pipeline, result filtering,
//! and aggregate statistics.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Storage is reached
//! only through the [`store::Store`] trait, which callers construct and pass
//! in explicitly.

pub mod calc;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod summary;

pub use calc::{compute, compute_with, CalcError, CalcOptions, Rounding};
pub use models::{CityRule, ContributionResult, RunSummary, SalaryRecord, Table};
