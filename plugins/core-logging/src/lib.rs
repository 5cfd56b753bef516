//! Core logging plugin.
//!
//! Installs a `tracing` subscriber for the whole process and routes `log`
//! records into it. Settings are read from the configuration store when the
//! plugin is activated; `RUST_LOG` overrides the configured level.
use async_trait::async_trait;
use tessera_core::config::ConfigStore;
use tessera_core::kernel::context::ServiceContext;
use tessera_core::kernel::error::{Error as KernelError, Result as KernelResult};
use tessera_core::plugin_system::traits::Plugin;
use tessera_core::plugin_system::version::VersionRange;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Config key for the log level or filter directive, e.g. `"debug"` or `"tessera_core=trace"`
pub const LEVEL_KEY: &str = "logging.level";
/// Config key switching to JSON output
pub const JSON_KEY: &str = "logging.json";

const DEFAULT_LEVEL: &str = "info";

/// Logger settings resolved from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            json: false,
        }
    }
}

impl LogSettings {
    pub fn from_config(config: &ConfigStore) -> Self {
        Self {
            level: config
                .get_as::<String>(LEVEL_KEY)
                .unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            json: config.get_as::<bool>(JSON_KEY).unwrap_or(false),
        }
    }

    /// `RUST_LOG` when set and valid, else the configured level.
    pub fn filter(&self) -> Result<EnvFilter, ParseError> {
        EnvFilter::try_from_default_env().or_else(|_| self.configured_filter())
    }

    /// Filter built from the configured level alone.
    pub fn configured_filter(&self) -> Result<EnvFilter, ParseError> {
        EnvFilter::try_new(&self.level)
    }

    /// Install the global subscriber. Fails if one is already installed.
    /// An invalid level falls back to the default and is reported through
    /// the new subscriber.
    pub fn install(&self) -> KernelResult<()> {
        let (filter, invalid_level) = match self.filter() {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new(DEFAULT_LEVEL), Some(e)),
        };

        tracing_log::LogTracer::init()
            .map_err(|e| KernelError::from(format!("Failed to bridge log records: {}", e)))?;

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        let installed = if self.json {
            tracing::subscriber::set_global_default(builder.json().finish())
        } else {
            tracing::subscriber::set_global_default(builder.finish())
        };
        installed.map_err(|e| KernelError::from(format!("Failed to install subscriber: {}", e)))?;

        if let Some(e) = invalid_level {
            tracing::warn!("Invalid log level '{}': {}; using '{}'", self.level, e, DEFAULT_LEVEL);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LoggingPlugin;

#[async_trait]
impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        "core-logging"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        const COMPATIBLE_API_REQ: &str = "^0.1";
        match VersionRange::from_constraint(COMPATIBLE_API_REQ) {
            Ok(range) => vec![range],
            Err(e) => {
                log::error!(
                    "Failed to parse API version requirement ('{}') for {}: {}",
                    COMPATIBLE_API_REQ,
                    self.name(),
                    e
                );
                vec![]
            }
        }
    }

    async fn init(&self, context: &ServiceContext) -> KernelResult<()> {
        let settings = LogSettings::from_config(context.config());
        match settings.install() {
            Ok(()) => log::info!(
                "Logging initialized (level '{}', json: {})",
                settings.level,
                settings.json
            ),
            // Another subscriber (e.g. a test harness) got there first.
            Err(e) => log::debug!("Keeping existing logger: {}", e),
        }
        Ok(())
    }
}
