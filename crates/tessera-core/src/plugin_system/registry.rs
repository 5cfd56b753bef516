use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;
use crate::plugin_system::version::ApiVersion;

/// Registry of plugins known to one renderer instance.
///
/// A plugin is *registered* once its batch has been reserved and *active*
/// once its `init` succeeded. Names are unique: each plugin is activated at
/// most once.
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
    /// Active plugin names in activation order
    active: Vec<String>,
    api_version: ApiVersion,
}

impl PluginRegistry {
    pub fn new(api_version: ApiVersion) -> Self {
        Self {
            plugins: HashMap::new(),
            active: Vec::new(),
            api_version,
        }
    }

    pub fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|active| active == name)
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Active plugin names in activation order
    pub fn active_names(&self) -> &[String] {
        &self.active
    }

    /// Active plugins in activation order
    pub fn active_plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.active
            .iter()
            .filter_map(|name| self.plugins.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Check the plugin against the registry's API version.
    pub fn check_api_compatibility(&self, plugin: &dyn Plugin) -> Result<(), PluginSystemError> {
        let ranges = plugin.compatible_api_versions();
        if ranges.is_empty() {
            return Ok(());
        }
        let api_semver = self.api_version.to_semver();
        if ranges.iter().any(|range| range.includes(&api_semver)) {
            return Ok(());
        }
        Err(PluginSystemError::IncompatibleApi {
            plugin_id: plugin.name().to_string(),
            api_version: self.api_version.to_string(),
            supported: ranges
                .iter()
                .map(|range| range.constraint_string())
                .collect::<Vec<_>>()
                .join(" || "),
        })
    }

    /// Validate a batch and reserve its names.
    ///
    /// Plugins whose name is already registered (or repeated within the batch)
    /// are skipped with a warning. The remaining plugins are checked for API
    /// compatibility and dependencies, then returned in activation order.
    /// Nothing is reserved when validation fails.
    pub fn reserve_batch(
        &mut self,
        batch: Vec<Arc<dyn Plugin>>,
    ) -> Result<Vec<Arc<dyn Plugin>>, PluginSystemError> {
        let mut fresh: Vec<Arc<dyn Plugin>> = Vec::with_capacity(batch.len());
        for plugin in batch {
            let name = plugin.name();
            if self.plugins.contains_key(name) || fresh.iter().any(|p| p.name() == name) {
                log::warn!("Plugin '{}' is already registered, skipping", name);
                continue;
            }
            self.check_api_compatibility(plugin.as_ref())?;
            fresh.push(plugin);
        }

        self.check_dependencies(&fresh)?;
        let ordered = Self::activation_order(&fresh)?;
        for plugin in &ordered {
            self.plugins.insert(plugin.name().to_string(), Arc::clone(plugin));
        }
        Ok(ordered)
    }

    fn check_dependencies(&self, batch: &[Arc<dyn Plugin>]) -> Result<(), DependencyError> {
        for plugin in batch {
            for dep in plugin.dependencies() {
                let provider = self
                    .plugins
                    .get(&dep.plugin_name)
                    .cloned()
                    .or_else(|| batch.iter().find(|p| p.name() == dep.plugin_name).cloned());

                match provider {
                    None if dep.required => {
                        return Err(DependencyError::MissingPlugin {
                            plugin_name: plugin.name().to_string(),
                            dependency: dep.plugin_name.clone(),
                        });
                    }
                    None => log::debug!(
                        "Optional dependency '{}' of plugin '{}' is not registered",
                        dep.plugin_name,
                        plugin.name()
                    ),
                    Some(provider) if !dep.is_compatible_with(provider.version()) => {
                        if let (true, Some(range)) = (dep.required, dep.version_range.clone()) {
                            return Err(DependencyError::IncompatibleVersion {
                                plugin_name: dep.plugin_name.clone(),
                                required_range: range,
                                actual_version: provider.version().to_string(),
                            });
                        }
                        log::warn!(
                            "Optional dependency '{}' of plugin '{}' has incompatible version {}",
                            dep.plugin_name,
                            plugin.name(),
                            provider.version()
                        );
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Order a batch so every plugin comes after the batch members it depends
    /// on (Kahn's algorithm). Independent plugins keep their batch order.
    pub fn activation_order(
        batch: &[Arc<dyn Plugin>],
    ) -> Result<Vec<Arc<dyn Plugin>>, DependencyError> {
        let index: HashMap<&str, usize> = batch
            .iter()
            .enumerate()
            .map(|(i, plugin)| (plugin.name(), i))
            .collect();

        let mut remaining = vec![0usize; batch.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); batch.len()];
        for (i, plugin) in batch.iter().enumerate() {
            for dep in plugin.dependencies() {
                if let Some(&j) = index.get(dep.plugin_name.as_str()) {
                    remaining[i] += 1;
                    dependents[j].push(i);
                }
            }
        }

        let mut queue: VecDeque<usize> = (0..batch.len()).filter(|&i| remaining[i] == 0).collect();
        let mut order = Vec::with_capacity(batch.len());
        while let Some(i) = queue.pop_front() {
            order.push(i);
            for &dependent in &dependents[i] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() < batch.len() {
            let cycle = (0..batch.len())
                .filter(|i| !order.contains(i))
                .map(|i| batch[i].name().to_string())
                .collect();
            return Err(DependencyError::CyclicDependency(cycle));
        }
        Ok(order.into_iter().map(|i| Arc::clone(&batch[i])).collect())
    }

    pub fn mark_active(&mut self, name: &str) {
        if self.plugins.contains_key(name) && !self.is_active(name) {
            self.active.push(name.to_string());
        }
    }

    /// Drop a reservation (or registration) so the name can be registered again.
    pub fn release(&mut self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.active.retain(|active| active != name);
        self.plugins.remove(name)
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("registered", &self.plugins.len())
            .field("active", &self.active)
            .field("api_version", &self.api_version.to_string())
            .finish()
    }
}
