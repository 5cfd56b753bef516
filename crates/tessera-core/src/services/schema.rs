use std::fmt;

use parking_lot::RwLock;
use serde_json::Value;

use crate::config::path;
use crate::services::error::ServiceError;
use crate::utils::value_kind;

/// Holds the application schema
pub trait SchemaService: Send + Sync + fmt::Debug {
    /// Accept the schema supplied in the renderer options
    fn initialize(&self, schema: Value) -> Result<(), ServiceError>;

    /// The current schema, once initialized
    fn schema(&self) -> Option<Value>;

    /// Path lookup into the schema, e.g. `"componentsTree[0].componentName"`.
    fn get(&self, path: &str) -> Option<Value> {
        let schema = self.schema()?;
        path::lookup(&schema, &path::parse_path(path)).cloned()
    }
}

/// Stores the schema after checking that it is a JSON object.
#[derive(Default)]
pub struct DefaultSchemaService {
    schema: RwLock<Option<Value>>,
}

impl DefaultSchemaService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.schema.read().is_some()
    }
}

impl SchemaService for DefaultSchemaService {
    fn initialize(&self, schema: Value) -> Result<(), ServiceError> {
        if !schema.is_object() {
            return Err(ServiceError::InvalidSchema {
                reason: format!("expected an object, got {}", value_kind(&schema)),
            });
        }
        let mut slot = self.schema.write();
        if slot.is_some() {
            log::debug!("Replacing previously initialized schema");
        }
        *slot = Some(schema);
        Ok(())
    }

    fn schema(&self) -> Option<Value> {
        self.schema.read().clone()
    }
}

impl fmt::Debug for DefaultSchemaService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultSchemaService")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
