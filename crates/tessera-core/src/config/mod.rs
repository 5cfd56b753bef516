//! # Tessera Core Configuration
//!
//! Reactive key-value configuration shared by the bootstrapper, the plugin
//! host and plugins.
//!
//! - **[`store`]**: [`ConfigStore`], a store of `serde_json::Value`s with an
//!   optional strict-mode validator and "value becomes available"
//!   subscriptions ([`ConfigStore::once_got`], [`ConfigStore::on_got`]).
//! - **[`path`]**: dotted/indexed path lookup (`"theme.colors[0]"`) into stored values.
//! - **[`document`]**: reading application documents in JSON, YAML or TOML.
//! - **[`error`]**: [`ConfigError`].
pub mod document;
pub mod error;
pub mod path;
pub mod store;

pub use document::ConfigFormat;
pub use error::ConfigError;
pub use store::{ConfigStore, StoreOptions, Subscription, SubscriptionId, Validation, Validator};

#[cfg(test)]
mod tests;
