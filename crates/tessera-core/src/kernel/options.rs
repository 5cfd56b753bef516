use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::document::read_document;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::traits::Plugin;
use crate::services::package::PackageDescriptor;

/// Render mode. Parsed case-insensitively from the CLI and from documents alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Mode::Development)
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Mode::Development),
            "production" => Ok(Mode::Production),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one bootstrap
#[derive(Clone, Default)]
pub struct RendererOptions {
    pub schema: Value,
    /// `None` resolves to [`Mode::Production`]
    pub mode: Option<Mode>,
    /// Registered in dependency order once the render object exists
    pub plugins: Vec<Arc<dyn Plugin>>,
    pub code_runtime: Option<Value>,
    pub packages: Vec<PackageDescriptor>,
    /// Seeded into the config store before any phase advances
    pub config: Map<String, Value>,
}

impl RendererOptions {
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_package(mut self, package: PackageDescriptor) -> Self {
        self.packages.push(package);
        self
    }

    pub fn with_code_runtime(mut self, config: Value) -> Self {
        self.code_runtime = Some(config);
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn resolved_mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }

    /// Serializable copy kept on the application for diagnostics
    pub fn snapshot(&self) -> OptionsSnapshot {
        OptionsSnapshot {
            schema: self.schema.clone(),
            mode: self.resolved_mode(),
            plugins: self.plugins.iter().map(|p| p.name().to_string()).collect(),
            code_runtime: self.code_runtime.clone(),
            packages: self.packages.clone(),
            config: self.config.clone(),
        }
    }
}

impl fmt::Debug for RendererOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("RendererOptions")
            .field("schema", &self.schema)
            .field("mode", &self.mode)
            .field("plugins", &plugins)
            .field("code_runtime", &self.code_runtime)
            .field("packages", &self.packages)
            .field("config", &self.config)
            .finish()
    }
}

/// Options as they were when the bootstrap started, with plugins by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSnapshot {
    pub schema: Value,
    pub mode: Mode,
    pub plugins: Vec<String>,
    pub code_runtime: Option<Value>,
    pub packages: Vec<PackageDescriptor>,
    pub config: Map<String, Value>,
}

/// Application document: renderer options as stored on disk. Plugins are
/// code and are added by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsDocument {
    pub schema: Value,
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,
    #[serde(default)]
    pub code_runtime: Option<Value>,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl OptionsDocument {
    /// Read a JSON, YAML or TOML document, by extension.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(read_document(path)?)
    }

    pub fn into_options(self) -> RendererOptions {
        RendererOptions {
            schema: self.schema,
            mode: self.mode,
            plugins: Vec::new(),
            code_runtime: self.code_runtime,
            packages: self.packages,
            config: self.config,
        }
    }
}
