//! # Tessera Core Kernel
//!
//! The kernel bootstraps an application: it owns the
//! [`ServiceContext`](context::ServiceContext), drives the lifecycle phases and
//! produces the immutable [`RendererApplication`](application::RendererApplication).
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrapping**: [`Bootstrapper`](bootstrap::Bootstrapper) runs one
//!   application through its phases; [`Renderer`](bootstrap::Renderer) and
//!   [`RendererBuilder`](bootstrap::RendererBuilder) are the entry points.
//! - **Render adapters**: the [`RenderAdapter`](adapter::RenderAdapter) trait,
//!   plus [`adapter_fn`](adapter::adapter_fn) for closures.
//! - **Options**: [`RendererOptions`](options::RendererOptions), [`Mode`](options::Mode)
//!   and the on-disk [`OptionsDocument`](options::OptionsDocument).
//! - **Core Constants** and **Error Handling** ([`Error`](error::Error), `Result`).
pub mod adapter;
pub mod application;
pub mod bootstrap;
pub mod constants;
pub mod context;
pub mod error;
pub mod options;

pub use adapter::{adapter_fn, FnAdapter, RenderAdapter};
pub use application::{ApplicationBuilder, RendererApplication};
pub use bootstrap::{create_renderer, Bootstrapper, Renderer, RendererBuilder, ServiceFactory};
pub use context::{RenderContext, ServiceContext, Services};
pub use error::{Error, Result};
pub use options::{Mode, OptionsDocument, OptionsSnapshot, RendererOptions};

#[cfg(test)]
mod tests;
