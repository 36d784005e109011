//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/contrib.sqlite"
//!
//! [calculation]
//! rounding = "half_up"   # or "half_even"
//!
//! [logging]
//! level = "info"         # RUST_LOG takes precedence when set
//! ```
//!
//! Only `[db]` is required.

use anyhow::{Context, Result};
use contrib_core::calc::{CalcOptions, Rounding};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub calculation: CalculationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CalculationConfig {
    /// Midpoint rule for 2-decimal rounding of averages and fees.
    #[serde(default)]
    pub rounding: Rounding,
}

impl CalculationConfig {
    pub fn options(&self) -> CalcOptions {
        CalcOptions {
            rounding: self.rounding,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    match config.logging.level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
        other => anyhow::bail!(
            "Unknown logging.level: '{}'. Must be trace, debug, info, warn, error, or off.",
            other
        ),
    }

    Ok(config)
}
