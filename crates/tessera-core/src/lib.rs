//! # Tessera Core
//!
//! Bootstrap and lifecycle core of the Tessera schema-driven renderer. The crate
//! wires a reactive configuration store, a phased lifecycle coordinator and a
//! plugin host into an explicit service context, then hands that context to a
//! caller-supplied render adapter.
pub mod config;
pub mod kernel;
pub mod lifecycle;
pub mod plugin_system;
pub mod services;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and plugins
pub use config::{ConfigStore, StoreOptions, Subscription, Validation};
pub use kernel::error::Error as KernelError;
pub use kernel::{
    adapter_fn, create_renderer, Bootstrapper, Mode, RenderAdapter, RenderContext, Renderer,
    RendererApplication, RendererBuilder, RendererOptions, ServiceContext,
};
pub use lifecycle::{LifecycleCoordinator, Phase};
pub use plugin_system::{Plugin, PluginManager};

#[cfg(test)]
mod tests;
