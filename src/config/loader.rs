// src/config/loader.rs

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::model::{ConfigRecord, ResolvedConfig};
use crate::config::normalize::normalize;
use crate::errors::ConfigError;

/// Load a configuration record from `path`.
///
/// This only performs TOML deserialization; missing sections stay `None`.
/// Use [`load_and_resolve`] to also apply defaults and validation.
pub fn load(path: impl AsRef<Path>) -> Result<ConfigRecord, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let record: ConfigRecord = toml::from_str(&contents).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })?;

    debug!(path = %path.display(), "config record loaded");
    Ok(record)
}

/// Load, fill defaults, validate, and resolve relative paths.
///
/// This is the entry point the rest of the application uses.
pub fn load_and_resolve(path: impl AsRef<Path>) -> Result<ResolvedConfig, ConfigError> {
    let path = path.as_ref();
    let record = normalize(load(path)?);
    let mut cfg = ResolvedConfig::try_from(record)?;

    let root = config_root_dir(path);
    if cfg.engine.marker_dir.is_relative() {
        cfg.engine.marker_dir = root.join(&cfg.engine.marker_dir);
    }

    info!(summary = %cfg.summary(), "configuration resolved");
    Ok(cfg)
}

/// Atomically replace `path` with the serialized `record`.
///
/// The record is written to a temporary file in the same directory, flushed
/// to disk, and then renamed over the target, so readers never observe a
/// truncated file.
pub fn save(record: &ConfigRecord, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let contents = toml::to_string_pretty(record).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    write_atomic(path, contents.as_bytes()).map_err(|source| ConfigError::Save {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "config saved");
    Ok(())
}

/// Write-to-temp then rename. Shared with the splice marker writer.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = config_root_dir(path);
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Directory holding `path`.
///
/// - "configs/inject.toml" -> "configs"
/// - bare "inject.toml" -> the current working directory
fn config_root_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "scte35-inject.toml";
