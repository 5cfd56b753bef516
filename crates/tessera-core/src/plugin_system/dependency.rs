use std::fmt;

use thiserror::Error;

use crate::plugin_system::version::VersionRange;

/// Dependency on another plugin
#[derive(Debug, Clone)]
pub struct PluginDependency {
    pub plugin_name: String,
    /// `None` accepts any version
    pub version_range: Option<VersionRange>,
    /// Optional dependencies only influence activation order
    pub required: bool,
}

/// Error that can occur when resolving dependencies
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("Plugin '{plugin_name}' requires plugin '{dependency}', which is not registered")]
    MissingPlugin { plugin_name: String, dependency: String },

    #[error("Plugin version mismatch: '{plugin_name}' requires version '{required_range}' but found '{actual_version}'")]
    IncompatibleVersion {
        plugin_name: String,
        required_range: VersionRange,
        actual_version: String,
    },

    #[error("Circular dependency detected between: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
}

impl PluginDependency {
    pub fn required(plugin_name: &str, version_range: VersionRange) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: Some(version_range),
            required: true,
        }
    }

    pub fn required_any(plugin_name: &str) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: None,
            required: true,
        }
    }

    pub fn optional(plugin_name: &str, version_range: VersionRange) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: Some(version_range),
            required: false,
        }
    }

    pub fn optional_any(plugin_name: &str) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: None,
            required: false,
        }
    }

    /// Check if this dependency accepts the given plugin version string
    pub fn is_compatible_with(&self, version_str: &str) -> bool {
        let Some(range) = &self.version_range else {
            return true;
        };
        match semver::Version::parse(version_str) {
            Ok(version) => range.includes(&version),
            Err(e) => {
                log::warn!(
                    "Could not parse version '{}' of plugin '{}': {}",
                    version_str,
                    self.plugin_name,
                    e
                );
                false
            }
        }
    }
}

impl fmt::Display for PluginDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let requirement_type = if self.required { "Requires" } else { "Optional" };
        match &self.version_range {
            Some(range) => write!(
                f,
                "{} plugin: {} (version: {})",
                requirement_type,
                self.plugin_name,
                range.constraint_string()
            ),
            None => write!(f, "{} plugin: {} (any version)", requirement_type, self.plugin_name),
        }
    }
}
