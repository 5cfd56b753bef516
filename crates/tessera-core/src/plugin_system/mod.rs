//! # Tessera Core Plugin System
//!
//! Plugins extend a running renderer. They are registered in batches during
//! bootstrap and one at a time afterwards through
//! [`RendererApplication::use_plugin`](crate::kernel::RendererApplication::use_plugin).
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`Plugin`] trait every plugin implements.
//! - **[`registry`]**: [`PluginRegistry`], which records registered plugins, rejects
//!   duplicates and orders a batch by its dependencies.
//! - **[`manager`]**: [`PluginManager`], the host that activates plugins against a
//!   [`ServiceContext`](crate::kernel::ServiceContext).
//! - **[`dependency`]**: [`PluginDependency`] and dependency resolution errors.
//! - **[`version`]**: API version and version-range handling (semver).
//! - **[`error`]**: [`PluginSystemError`].
pub mod dependency;
pub mod error;
pub mod manager;
pub mod registry;
pub mod traits;
pub mod version;

pub use dependency::{DependencyError, PluginDependency};
pub use error::PluginSystemError;
pub use manager::PluginManager;
pub use registry::PluginRegistry;
pub use traits::Plugin;
pub use version::{ApiVersion, VersionError, VersionRange};

#[cfg(test)]
mod tests;
