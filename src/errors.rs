// src/errors.rs

//! Crate-wide error types.
//!
//! `anyhow` is only used at the outer `run` boundary; everything below it
//! returns [`InjectError`] so callers can match on the failure class.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading, validating or saving the configuration record.
///
/// All of these are recoverable: the operator can fix the file, or the
/// caller can fall back to `normalize` defaults.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("malformed config {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: String, reason: String },

    #[error("failed to save config {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while building a splice command.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpliceError {
    #[error("event id {got} is not greater than the last generated id {last}")]
    NonMonotonicEventId { last: u32, got: u32 },

    #[error("break duration of {ticks} ticks does not fit in 32 bits")]
    DurationOverflow { ticks: u64 },
}

#[derive(Error, Debug)]
pub enum InjectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Splice(#[from] SpliceError),

    /// The engine could not be started at all. Fatal for the session.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("empty argument list; nothing to spawn")]
    EmptyArgv,

    /// The engine exited before a stop was requested.
    #[error("external engine exited unexpectedly (exit code {code:?})")]
    ProcessCrashed { code: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InjectError>;
