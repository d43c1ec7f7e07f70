// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;
use crate::types::PolicyKind;

/// Command-line arguments for `scte35-inject`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "scte35-inject",
    version,
    about = "Inject SCTE-35 splice markers into a live transport stream via an external engine.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SCTE35_INJECT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Generate a splice command, run the engine, and watch for markers.
    Inject {
        /// cue-out, cue-in, preroll or crash-out.
        #[arg(long, value_name = "KIND")]
        kind: PolicyKind,

        /// Number of consecutive injection cycles in this session.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },

    /// Cancel a previously signalled event.
    Cancel {
        #[arg(long, value_name = "ID")]
        event_id: u32,
    },

    /// Print the engine argument list without running anything.
    Args {
        #[arg(long, value_name = "KIND")]
        kind: PolicyKind,
    },

    /// Print a status snapshot (marker files, resolved config).
    Status,

    /// Write a config file holding every default.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
