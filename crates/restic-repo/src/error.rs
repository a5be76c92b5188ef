//! Error types for repository operations

use std::io;
use thiserror::Error;

/// Errors that can occur while working with a repository
#[derive(Debug, Error)]
pub enum Error {
    /// The restic invocation itself failed
    #[error(transparent)]
    Restic(#[from] restic_exec::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Environment variables referenced by the configuration are not set
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// restic produced output that does not have the expected shape
    #[error("Failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded
        context: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// Failed to read a configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse YAML configuration
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Failed to parse JSON configuration
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Create a decode error
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Exit code of the failed restic run, if this error came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Restic(err) => err.exit_code(),
            _ => None,
        }
    }
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, Error>;
