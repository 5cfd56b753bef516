//! # Tessera Core Plugin System Errors
//!
//! [`PluginSystemError`] covers registration (API compatibility, dependency
//! resolution) and activation failures. Activation failures wrap the kernel
//! error returned by the plugin itself.
use crate::kernel::error::Error as KernelError;
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin '{plugin_id}' is not compatible with API version {api_version} (supports {supported})")]
    IncompatibleApi {
        plugin_id: String,
        api_version: String,
        supported: String,
    },

    #[error("Plugin initialization error for '{plugin_id}': {source}")]
    InitializationError {
        plugin_id: String,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Plugin shutdown error for '{plugin_id}': {source}")]
    ShutdownError {
        plugin_id: String,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),
}
