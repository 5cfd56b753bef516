//! # Tessera Core Kernel Errors
//!
//! [`Error`] is the crate-wide error. Subsystem errors convert into it through
//! `#[from]` variants, so `?` works across module boundaries; the kernel adds
//! its own variants for bootstrap preconditions and phase failures.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::Phase;
use crate::plugin_system::error::PluginSystemError;
use crate::services::error::ServiceError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid construction arguments, raised before any options are processed
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Invalid mode '{0}', expected 'development' or 'production'")]
    InvalidMode(String),

    /// `main` was called twice on the same bootstrapper
    #[error("Renderer has already been bootstrapped")]
    AlreadyBootstrapped,

    /// Failure while the bootstrap was driving `phase`.
    #[error("Bootstrap failed during {phase}: {message}")]
    Bootstrap {
        phase: Phase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wrap `source` as a failure of `phase`.
    pub fn bootstrap(phase: Phase, message: impl Into<String>, source: Error) -> Self {
        Error::Bootstrap {
            phase,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
