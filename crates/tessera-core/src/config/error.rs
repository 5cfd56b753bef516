//! # Tessera Core Configuration Errors
//!
//! Errors raised while constructing a [`ConfigStore`](super::ConfigStore),
//! waiting on configuration values, or reading application documents.
//! Strict-mode rejections are deliberately absent: they are logged, not raised.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration must be a key-value mapping, got {found}")]
    NotAMapping { found: &'static str },

    #[error("A strict configuration store requires a validator")]
    MissingValidator,

    #[error("Wait for configuration key '{key}' was cancelled: the store was disposed")]
    WaitCancelled { key: String },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Deserialization from '{format}' failed: {source}")]
    Deserialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl ConfigError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
