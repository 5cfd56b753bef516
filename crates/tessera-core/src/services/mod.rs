//! # Tessera Core Services
//!
//! Collaborators the bootstrapper drives but does not own: schema handling,
//! package loading, the code runtime and the component tree model. Each is a
//! narrow trait with an in-crate default, injected through
//! [`RendererBuilder`](crate::kernel::RendererBuilder).
//!
//! - **[`schema`]**: [`SchemaService`] / [`DefaultSchemaService`].
//! - **[`package`]**: [`PackageManager`] / [`DefaultPackageManager`] and [`PackageDescriptor`].
//! - **[`runtime`]**: [`CodeRuntime`] / [`DefaultCodeRuntime`].
//! - **[`tree`]**: [`ComponentTree`], built from the schema's `componentsTree`.
//! - **[`error`]**: [`ServiceError`].
pub mod error;
pub mod package;
pub mod runtime;
pub mod schema;
pub mod tree;

pub use error::ServiceError;
pub use package::{DefaultPackageManager, PackageDescriptor, PackageManager};
pub use runtime::{CodeRuntime, DefaultCodeRuntime};
pub use schema::{DefaultSchemaService, SchemaService};
pub use tree::{ComponentNode, ComponentTree};
