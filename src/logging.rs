//! Diagnostic logging setup.
//!
//! Logs go to stderr through `tracing`, so stdout stays parseable for
//! scripts (`--json` output, `export` to stdout). `RUST_LOG` overrides the
//! configured level when set.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
