// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SCTE35_INJECT_LOG` environment variable, in `EnvFilter` syntax
//!    (e.g. "debug" or "scte35_inject::verify=trace")
//! 3. default to `info`
//!
//! Logs go to STDERR; stdout carries reports and `args` output only.

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "SCTE35_INJECT_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(filter_for(cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn filter_for(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(directive(level)),
        None => EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

/// The CLI value names ("error" .. "trace") double as filter directives.
fn directive(level: LogLevel) -> String {
    level
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_levels_are_filter_directives() {
        assert_eq!(directive(LogLevel::Warn), "warn");
        assert_eq!(directive(LogLevel::Trace), "trace");
    }

    #[test]
    fn cli_level_wins() {
        let filter = filter_for(Some(LogLevel::Debug));
        assert_eq!(filter.to_string(), "debug");
    }
}
