use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::kernel::constants;
use crate::kernel::context::ServiceContext;
use crate::kernel::error::Result;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::Plugin;
use crate::plugin_system::version::ApiVersion;

/// Plugin host: registers plugins and activates them against a service context.
pub struct PluginManager {
    registry: Mutex<PluginRegistry>,
}

impl PluginManager {
    /// Plugin manager for the crate's API version
    pub fn new() -> Result<Self> {
        let api_version: ApiVersion = constants::API_VERSION
            .parse()
            .map_err(PluginSystemError::VersionParsing)?;
        Ok(Self::with_api_version(api_version))
    }

    pub fn with_api_version(api_version: ApiVersion) -> Self {
        Self {
            registry: Mutex::new(PluginRegistry::new(api_version)),
        }
    }

    pub fn registry(&self) -> &Mutex<PluginRegistry> {
        &self.registry
    }

    /// Register and activate a single plugin. See [`register_plugins`](Self::register_plugins).
    pub async fn register_plugin(
        &self,
        plugin: Arc<dyn Plugin>,
        context: &ServiceContext,
    ) -> Result<Vec<String>> {
        self.register_plugins(vec![plugin], context).await
    }

    /// Register a batch and activate it in dependency order. Returns the
    /// names that were activated; already registered plugins are skipped.
    ///
    /// An `init` failure aborts the rest of the batch. Plugins activated
    /// before the failure stay active; the failed and remaining ones are
    /// released so they can be registered again.
    pub async fn register_plugins(
        &self,
        plugins: Vec<Arc<dyn Plugin>>,
        context: &ServiceContext,
    ) -> Result<Vec<String>> {
        // The lock is not held across `init`, so plugins may register plugins.
        let ordered = self.registry.lock().await.reserve_batch(plugins)?;

        let mut activated = Vec::with_capacity(ordered.len());
        let mut pending = ordered.into_iter();
        while let Some(plugin) = pending.next() {
            let name = plugin.name().to_string();
            log::info!("Activating plugin '{}' v{}", name, plugin.version());

            if let Err(e) = plugin.init(context).await {
                log::error!("Plugin '{}' failed to initialize: {}", name, e);
                let mut registry = self.registry.lock().await;
                registry.release(&name);
                for remaining in pending {
                    registry.release(remaining.name());
                }
                return Err(PluginSystemError::InitializationError {
                    plugin_id: name,
                    source: Box::new(e),
                }
                .into());
            }

            self.registry.lock().await.mark_active(&name);
            activated.push(name);
        }
        Ok(activated)
    }

    /// Active plugin names in activation order
    pub async fn plugin_names(&self) -> Vec<String> {
        self.registry.lock().await.active_names().to_vec()
    }

    pub async fn is_registered(&self, name: &str) -> bool {
        self.registry.lock().await.is_registered(name)
    }

    pub async fn is_active(&self, name: &str) -> bool {
        self.registry.lock().await.is_active(name)
    }

    /// Destroy active plugins in reverse activation order. Every plugin is
    /// destroyed and released; the first failure is returned.
    pub async fn shutdown_all(&self, context: &ServiceContext) -> Result<()> {
        let plugins = self.registry.lock().await.active_plugins();
        let mut first_error = None;

        for plugin in plugins.iter().rev() {
            let name = plugin.name().to_string();
            log::info!("Destroying plugin '{}'", name);
            if let Err(e) = plugin.destroy(context).await {
                log::error!("Plugin '{}' failed to shut down: {}", name, e);
                first_error.get_or_insert(PluginSystemError::ShutdownError {
                    plugin_id: name.clone(),
                    source: Box::new(e),
                });
            }
            self.registry.lock().await.release(&name);
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Avoid locking in Debug
        f.debug_struct("PluginManager").finish_non_exhaustive()
    }
}
