use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Log level selected by the number of `-v` flags.
#[must_use]
pub const fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries only
/// metric output. `RUST_LOG` takes precedence over `-v`.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or the filter is invalid.
pub fn init(verbosity: u8) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "{}={},sqlx=warn",
            env!("CARGO_CRATE_NAME"),
            level(verbosity)
        ))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
