//! # Contribution Calculator
//!
//! Computes the employer's social-insurance and housing-fund contribution
//! for every employee in every configured city, from monthly salary records
//! and per-city contribution rules, and keeps the results in SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │ salaries +  │──▶│ contrib-core │──▶│  SQLite  │
//! │ city rules  │   │ average/clamp│   │ results  │
//! └─────────────┘   └──────────────┘   └────┬─────┘
//!                                           │
//!                        ┌──────────────────┤
//!                        ▼                  ▼
//!                 ┌────────────┐     ┌────────────┐
//!                 │  results / │     │   export   │
//!                 │   stats    │     │   (JSON)   │
//!                 └────────────┘     └────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. `contrib load` validates two JSON documents and overwrites the
//!    `salaries` and `cities` tables ([`load`]).
//! 2. `contrib calculate` reads both tables, runs the pure calculation in
//!    [`contrib_core::calc`], and swaps the `results` table in one
//!    transaction ([`calculate`], [`sqlite_store`]).
//! 3. `contrib results`, `contrib stats`, and `contrib export` read the
//!    stored results back ([`results`], [`stats`], [`export`]).
//!
//! ## Quick Start
//!
//! ```bash
//! contrib init
//! contrib load --salaries salaries.json --cities cities.json
//! contrib calculate
//! contrib results --city beijing
//! contrib stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` trait |
//! | [`load`] | Input validation and overwrite-all loading |
//! | [`calculate`] | Calculation run command |
//! | [`results`] | Filtered result listing |
//! | [`stats`] | Aggregate statistics and last run |
//! | [`export`] | JSON export |
//! | [`logging`] | `tracing` subscriber setup |

pub mod calculate;
pub mod config;
pub mod db;
pub mod export;
pub mod load;
pub mod logging;
pub mod migrate;
pub mod results;
pub mod sqlite_store;
pub mod stats;

pub use contrib_core::{query, store};
pub use contrib_core::{CalcError, CityRule, ContributionResult, SalaryRecord};
