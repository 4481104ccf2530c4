//! Core error types for hyprpomo-core.
//!
//! Most of these never reach the user: configuration and persistence
//! failures are recovered where they happen and only logged. They exist so
//! the recovering code has something precise to log.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// A duration string that matches neither `<int>` nor `<int>[s|m|h]`
    #[error("Invalid duration for '{key}': {value:?}")]
    InvalidDuration { key: String, value: String },

    /// Home/config directory could not be prepared
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Progression store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Data file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Data file is not valid progression JSON
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Data file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State could not be encoded
    #[error("Failed to serialize progression state: {0}")]
    Serialize(#[source] serde_json::Error),
}
