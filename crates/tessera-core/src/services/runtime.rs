use std::fmt;

use parking_lot::RwLock;
use serde_json::Value;

use crate::services::error::ServiceError;
use crate::utils::value_kind;

/// Runtime that evaluates the schema's embedded code
pub trait CodeRuntime: Send + Sync + fmt::Debug {
    fn initialize(&self, config: Value) -> Result<(), ServiceError>;

    /// Configuration passed to `initialize`, if it has run
    fn config(&self) -> Option<Value>;
}

#[derive(Debug, Default)]
pub struct DefaultCodeRuntime {
    config: RwLock<Option<Value>>,
}

impl DefaultCodeRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeRuntime for DefaultCodeRuntime {
    fn initialize(&self, config: Value) -> Result<(), ServiceError> {
        match config {
            Value::Object(_) | Value::Null => {
                *self.config.write() = Some(config);
                Ok(())
            }
            other => Err(ServiceError::InvalidRuntimeConfig {
                found: value_kind(&other),
            }),
        }
    }

    fn config(&self) -> Option<Value> {
        self.config.read().clone()
    }
}
