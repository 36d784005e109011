//! # Contribution Calculator CLI (`contrib`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `contrib init` | Create the SQLite database and tables |
//! | `contrib load` | Validate and overwrite salary and city-rule inputs |
//! | `contrib calculate` | Compute contributions and replace stored results |
//! | `contrib results` | List stored results, filtered by employee or city |
//! | `contrib stats` | Totals per city and per employee, and the last run |
//! | `contrib export` | Write results and statistics as JSON |
//!
//! ## Examples
//!
//! ```bash
//! contrib init --config ./config/contrib.toml
//! contrib load --salaries data/salaries.json --cities data/cities.json
//! contrib calculate
//! contrib results --employee alice --json
//! contrib export --output out/results.json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use contrib_calc::query::ResultFilter;
use contrib_calc::{calculate, config, export, load, logging, migrate, results, stats};

/// Employer social-insurance and housing-fund contribution calculator.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "contrib",
    about = "Employer contribution calculator — average salaries, clamp to city bands, compute fees",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/contrib.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the salaries, cities, results,
    /// and calc_runs tables. Idempotent.
    Init,

    /// Load salary records and city rules, replacing existing inputs.
    ///
    /// Both files are JSON arrays. All rows are validated before anything
    /// is written.
    Load {
        /// JSON array of `{employee_name, month, amount}` records.
        #[arg(long)]
        salaries: PathBuf,

        /// JSON array of `{city_name, year, rate, base_min, base_max}` rules.
        #[arg(long)]
        cities: PathBuf,

        /// Validate and report counts without writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Compute contributions for every employee in every city.
    ///
    /// Replaces the stored result set. Fails without writing if either
    /// input table is empty.
    Calculate {
        /// Compute and report counts without writing results.
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored results.
    Results {
        /// Case-insensitive substring of the employee name.
        #[arg(long)]
        employee: Option<String>,

        /// Case-insensitive substring of the city name.
        #[arg(long)]
        city: Option<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show totals per city and per employee.
    Stats {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Export results and statistics as JSON.
    Export {
        /// Output file. Writes to stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Case-insensitive substring of the employee name.
        #[arg(long)]
        employee: Option<String>,

        /// Case-insensitive substring of the city name.
        #[arg(long)]
        city: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init_tracing(&cfg.logging.level);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Load {
            salaries,
            cities,
            dry_run,
        } => {
            load::run_load(&cfg, &salaries, &cities, dry_run).await?;
        }
        Commands::Calculate { dry_run } => {
            calculate::run_calculate(&cfg, dry_run).await?;
        }
        Commands::Results {
            employee,
            city,
            json,
        } => {
            let filter = ResultFilter::new(employee, city);
            results::run_results(&cfg, &filter, json).await?;
        }
        Commands::Stats { json } => {
            stats::run_stats(&cfg, json).await?;
        }
        Commands::Export {
            output,
            employee,
            city,
        } => {
            let filter = ResultFilter::new(employee, city);
            export::run_export(&cfg, &filter, output.as_deref()).await?;
        }
    }

    Ok(())
}
