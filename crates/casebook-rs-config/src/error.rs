//! Error types for casebook config loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading or validating a casebook config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("config io error: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// A runtime layer was requested but the file does not exist.
    #[error("config layer not found: {}", .0.display())]
    MissingLayer(PathBuf),
    /// JSON5 syntax error.
    #[error("config is not valid json5: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Merged value does not match the config model.
    #[error("config does not match model: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// Schema violation at a dotted key path.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// Cross-field rule violated after merging.
    #[error("invalid config: {0}")]
    Invalid(String),
}
