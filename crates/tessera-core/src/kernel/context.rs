use std::fmt;
use std::sync::Arc;

use crate::config::store::ConfigStore;
use crate::kernel::error::Result;
use crate::lifecycle::LifecycleCoordinator;
use crate::plugin_system::manager::PluginManager;
use crate::services::package::{DefaultPackageManager, PackageManager};
use crate::services::runtime::{CodeRuntime, DefaultCodeRuntime};
use crate::services::schema::{DefaultSchemaService, SchemaService};
use crate::services::tree::ComponentTree;

/// Services owned by one bootstrap, before the component tree exists.
#[derive(Clone)]
pub struct Services {
    pub config: Arc<ConfigStore>,
    pub lifecycle: Arc<LifecycleCoordinator>,
    pub schema: Arc<dyn SchemaService>,
    pub package_manager: Arc<dyn PackageManager>,
    pub plugins: Arc<PluginManager>,
    pub code_runtime: Arc<dyn CodeRuntime>,
}

impl Services {
    /// Fresh default services with a non-strict config store
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            config: Arc::new(ConfigStore::default()),
            lifecycle: Arc::new(LifecycleCoordinator::new()),
            schema: Arc::new(DefaultSchemaService::new()),
            package_manager: Arc::new(DefaultPackageManager::new()),
            plugins: Arc::new(PluginManager::new()?),
            code_runtime: Arc::new(DefaultCodeRuntime::new()),
        })
    }

    /// Add the component tree, producing the context handed to the adapter and plugins.
    pub fn assemble_context(&self, component_tree: ComponentTree) -> ServiceContext {
        ServiceContext {
            config: Arc::clone(&self.config),
            lifecycle: Arc::clone(&self.lifecycle),
            schema: Arc::clone(&self.schema),
            package_manager: Arc::clone(&self.package_manager),
            plugins: Arc::clone(&self.plugins),
            code_runtime: Arc::clone(&self.code_runtime),
            component_tree: Arc::new(component_tree),
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .field("lifecycle", &self.lifecycle)
            .field("schema", &self.schema)
            .field("package_manager", &self.package_manager)
            .field("code_runtime", &self.code_runtime)
            .finish_non_exhaustive()
    }
}

/// Explicit dependency-injection context.
///
/// Assembled once per bootstrap, after options are resolved. Plugins receive
/// it by reference; the render adapter receives a clone. Cloning shares the
/// same services.
#[derive(Clone)]
pub struct ServiceContext {
    config: Arc<ConfigStore>,
    lifecycle: Arc<LifecycleCoordinator>,
    schema: Arc<dyn SchemaService>,
    package_manager: Arc<dyn PackageManager>,
    plugins: Arc<PluginManager>,
    code_runtime: Arc<dyn CodeRuntime>,
    component_tree: Arc<ComponentTree>,
}

/// Context passed to a [`RenderAdapter`](crate::kernel::RenderAdapter)
pub type RenderContext = ServiceContext;

impl ServiceContext {
    /// Context over fresh default services and an empty component tree
    pub fn with_defaults() -> Result<Self> {
        Ok(Services::with_defaults()?.assemble_context(ComponentTree::default()))
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleCoordinator> {
        &self.lifecycle
    }

    pub fn schema(&self) -> &Arc<dyn SchemaService> {
        &self.schema
    }

    pub fn package_manager(&self) -> &Arc<dyn PackageManager> {
        &self.package_manager
    }

    pub fn plugins(&self) -> &Arc<PluginManager> {
        &self.plugins
    }

    pub fn code_runtime(&self) -> &Arc<dyn CodeRuntime> {
        &self.code_runtime
    }

    pub fn component_tree(&self) -> &Arc<ComponentTree> {
        &self.component_tree
    }
}

impl fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContext")
            .field("phase", &self.lifecycle.phase())
            .field("config_keys", &self.config.keys().len())
            .field("components", &self.component_tree.node_count())
            .finish_non_exhaustive()
    }
}
