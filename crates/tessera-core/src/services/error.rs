use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },

    #[error("Schema service has not been initialized")]
    SchemaNotInitialized,

    #[error("Invalid package descriptor '{package}': {reason}")]
    InvalidPackage { package: String, reason: String },

    #[error("Failed to load package '{package}': {message}")]
    PackageLoad { package: String, message: String },

    #[error("Code runtime configuration must be an object or null, got {found}")]
    InvalidRuntimeConfig { found: &'static str },
}
