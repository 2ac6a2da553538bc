//! Error types for mix configuration and state handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while defaulting, converting, loading, or saving mix documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to determine working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse legacy config {path}: {source}")]
    LegacyParse {
        path: PathBuf,
        #[source]
        source: ::config::ConfigError,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing required field in config file: {0}")]
    MissingField(String),

    #[error("builder.conf contains an undefined environment variable: {0}")]
    UndefinedEnvVar(String),

    #[error("{path} has version {found}, newer than the supported version {latest}")]
    UnsupportedVersion {
        path: PathBuf,
        found: String,
        latest: String,
    },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error is an I/O failure caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
