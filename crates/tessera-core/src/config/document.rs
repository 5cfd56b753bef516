//! Reading application documents from disk.
//!
//! The format is picked from the file extension. YAML and TOML are behind the
//! `yaml-config` and `toml-config` features (both on by default).
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::error::ConfigError;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Deserialize `data` in this format.
    pub fn deserialize<T: DeserializeOwned>(&self, data: &str) -> Result<T, ConfigError> {
        let deserialization = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigError::Deserialization {
                format: self.extension().to_string(),
                source,
            }
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| deserialization(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| deserialization(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| deserialization(Box::new(e))),
        }
    }
}

/// Read and deserialize a document, choosing the format from its extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::io(e, "read_document", path.to_path_buf()))?;
    log::debug!("Read {} document from {}", format.extension(), path.display());
    format.deserialize(&content)
}
