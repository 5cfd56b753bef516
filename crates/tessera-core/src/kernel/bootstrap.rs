use std::fmt;
use std::sync::{Arc, OnceLock};

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::config::store::{ConfigStore, StoreOptions, Validation};
use crate::kernel::adapter::RenderAdapter;
use crate::kernel::application::{ApplicationBuilder, RendererApplication};
use crate::kernel::constants;
use crate::kernel::context::{ServiceContext, Services};
use crate::kernel::error::{Error, Result};
use crate::kernel::options::{OptionsSnapshot, RendererOptions};
use crate::lifecycle::{LifecycleCoordinator, Phase};
use crate::plugin_system::manager::PluginManager;
use crate::services::error::ServiceError;
use crate::services::package::{DefaultPackageManager, PackageManager};
use crate::services::runtime::{CodeRuntime, DefaultCodeRuntime};
use crate::services::schema::{DefaultSchemaService, SchemaService};
use crate::services::tree::ComponentTree;

type RenderStep = BoxFuture<'static, Result<()>>;

/// Single-use orchestrator for one application.
///
/// Construction prepares the render step, which waits for
/// [`Phase::OptionsResolved`], assembles the [`ServiceContext`], runs the
/// adapter and advances to [`Phase::Ready`]. [`main`](Self::main) drives that
/// step together with option handling, plugin registration and package
/// loading; [`get_app`](Self::get_app) then yields the finished application.
pub struct Bootstrapper<A: RenderAdapter> {
    services: Services,
    context: Arc<OnceLock<ServiceContext>>,
    output: Arc<OnceLock<Arc<A::Output>>>,
    options: OnceLock<OptionsSnapshot>,
    render_step: Mutex<Option<RenderStep>>,
}

impl<A: RenderAdapter> Bootstrapper<A> {
    pub fn new(adapter: Arc<A>, services: Services) -> Self {
        let context = Arc::new(OnceLock::new());
        let output = Arc::new(OnceLock::new());
        let render_step = Self::render_step(
            adapter,
            services.clone(),
            Arc::clone(&context),
            Arc::clone(&output),
        );
        Self {
            services,
            context,
            output,
            options: OnceLock::new(),
            render_step: Mutex::new(Some(render_step)),
        }
    }

    // Registers its OptionsResolved waiter immediately.
    fn render_step(
        adapter: Arc<A>,
        services: Services,
        context_slot: Arc<OnceLock<ServiceContext>>,
        output_slot: Arc<OnceLock<Arc<A::Output>>>,
    ) -> RenderStep {
        let resolved = services.lifecycle.when(Phase::OptionsResolved);
        async move {
            resolved.await?;

            let schema = services
                .schema
                .schema()
                .ok_or(ServiceError::SchemaNotInitialized)?;
            let tree = ComponentTree::from_schema(&schema)?;
            let context = context_slot
                .get_or_init(|| services.assemble_context(tree))
                .clone();

            log::debug!("Invoking render adapter");
            let output = adapter.render(context).await.map_err(|e| {
                Error::bootstrap(Phase::OptionsResolved, "render adapter failed", e)
            })?;
            // Only one render step exists per bootstrapper.
            let _ = output_slot.set(Arc::new(output));

            services.lifecycle.set_phase(Phase::Ready)?;
            Ok::<(), Error>(())
        }
        .boxed()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn phase(&self) -> Phase {
        self.services.lifecycle.phase()
    }

    /// Run the bootstrap to [`Phase::AfterInitPackageLoad`].
    ///
    /// Any failure aborts the whole bootstrap; the lifecycle and config store
    /// are disposed so no waiter stays pending. May be called once.
    pub async fn main(&self, options: RendererOptions) -> Result<()> {
        let render_step = self
            .render_step
            .lock()
            .take()
            .ok_or(Error::AlreadyBootstrapped)?;

        let result = tokio::try_join!(render_step, self.initialize(options));
        if let Err(e) = &result {
            log::error!("Bootstrap failed: {}", e);
            self.services.lifecycle.dispose();
            self.services.config.dispose();
        }
        result.map(|_| ())
    }

    async fn initialize(&self, options: RendererOptions) -> Result<()> {
        let mode = options.resolved_mode();
        let _ = self.options.set(options.snapshot());
        log::info!(
            "Bootstrapping {} v{} in {} mode",
            constants::APP_NAME,
            constants::APP_VERSION,
            mode
        );

        let RendererOptions {
            schema,
            plugins,
            code_runtime,
            packages,
            config,
            ..
        } = options;

        let config_store = &self.services.config;
        if config.contains_key(constants::MODE_CONFIG_KEY) {
            log::warn!(
                "Ignoring '{}' in option config, the resolved mode is '{}'",
                constants::MODE_CONFIG_KEY,
                mode
            );
        }
        let rejected = config_store.set_config(config);
        if !rejected.is_empty() {
            log::warn!("Configuration keys rejected by validator: {}", rejected.join(", "));
        }
        // Written last so the stored mode always matches the application's.
        config_store.set(constants::MODE_CONFIG_KEY, Value::String(mode.as_str().to_string()));

        self.services.schema.initialize(schema)?;
        self.services
            .code_runtime
            .initialize(code_runtime.unwrap_or(Value::Null))?;

        let ready = self.services.lifecycle.when(Phase::Ready);
        self.services.lifecycle.set_phase(Phase::OptionsResolved)?;
        ready.await?;

        let context = self.context.get().cloned().ok_or_else(|| Error::Bootstrap {
            phase: Phase::Ready,
            message: "service context was not assembled".to_string(),
            source: None,
        })?;

        let activated = self.services.plugins.register_plugins(plugins, &context).await?;
        log::debug!("Activated {} initial plugins", activated.len());

        self.services.package_manager.load_packages(packages).await?;

        self.services.lifecycle.set_phase(Phase::AfterInitPackageLoad)?;
        Ok(())
    }

    /// Wait for [`Phase::AfterInitPackageLoad`] and build the application.
    pub async fn get_app(&self) -> Result<RendererApplication<A::Output>> {
        self.services
            .lifecycle
            .when(Phase::AfterInitPackageLoad)
            .await?;

        let missing = |part: &str| Error::Bootstrap {
            phase: Phase::AfterInitPackageLoad,
            message: format!("{} is not available", part),
            source: None,
        };
        ApplicationBuilder::new()
            .options(self.options.get().cloned().ok_or_else(|| missing("options snapshot"))?)
            .context(self.context.get().cloned().ok_or_else(|| missing("service context"))?)
            .render(self.output.get().cloned().ok_or_else(|| missing("render output"))?)
            .build()
    }
}

impl<A: RenderAdapter> fmt::Debug for Bootstrapper<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("phase", &self.phase())
            .field("started", &self.render_step.lock().is_none())
            .finish_non_exhaustive()
    }
}

/// Builds a fresh service instance for each bootstrap
pub type ServiceFactory<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;

/// Bootstrap entry point: turns [`RendererOptions`] into a [`RendererApplication`].
pub struct Renderer<A: RenderAdapter> {
    adapter: Arc<A>,
    schema_service: ServiceFactory<dyn SchemaService>,
    package_manager: ServiceFactory<dyn PackageManager>,
    code_runtime: ServiceFactory<dyn CodeRuntime>,
    store_options: StoreOptions,
}

impl<A: RenderAdapter> Renderer<A> {
    /// Fresh services for one bootstrap
    pub fn services(&self) -> Result<Services> {
        Ok(Services {
            config: Arc::new(ConfigStore::new(Map::new(), self.store_options.clone())?),
            lifecycle: Arc::new(LifecycleCoordinator::new()),
            schema: (self.schema_service)(),
            package_manager: (self.package_manager)(),
            plugins: Arc::new(PluginManager::new()?),
            code_runtime: (self.code_runtime)(),
        })
    }

    pub fn bootstrapper(&self) -> Result<Bootstrapper<A>> {
        Ok(Bootstrapper::new(Arc::clone(&self.adapter), self.services()?))
    }

    /// Bootstrap one application. Each call gets its own services.
    pub async fn create(&self, options: RendererOptions) -> Result<RendererApplication<A::Output>> {
        let bootstrapper = self.bootstrapper()?;
        bootstrapper.main(options).await?;
        bootstrapper.get_app().await
    }
}

impl<A: RenderAdapter> fmt::Debug for Renderer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("store_options", &self.store_options)
            .finish_non_exhaustive()
    }
}

/// Renderer with the default services
pub fn create_renderer<A: RenderAdapter>(adapter: A) -> Renderer<A> {
    Renderer {
        adapter: Arc::new(adapter),
        schema_service: default_schema_service(),
        package_manager: default_package_manager(),
        code_runtime: default_code_runtime(),
        store_options: StoreOptions::default(),
    }
}

fn default_schema_service() -> ServiceFactory<dyn SchemaService> {
    Arc::new(|| Arc::new(DefaultSchemaService::new()) as Arc<dyn SchemaService>)
}

fn default_package_manager() -> ServiceFactory<dyn PackageManager> {
    Arc::new(|| Arc::new(DefaultPackageManager::new()) as Arc<dyn PackageManager>)
}

fn default_code_runtime() -> ServiceFactory<dyn CodeRuntime> {
    Arc::new(|| Arc::new(DefaultCodeRuntime::new()) as Arc<dyn CodeRuntime>)
}

/// Builder for a [`Renderer`] with custom services.
pub struct RendererBuilder<A: RenderAdapter> {
    adapter: Option<Arc<A>>,
    schema_service: Option<ServiceFactory<dyn SchemaService>>,
    package_manager: Option<ServiceFactory<dyn PackageManager>>,
    code_runtime: Option<ServiceFactory<dyn CodeRuntime>>,
    store_options: StoreOptions,
}

impl<A: RenderAdapter> Default for RendererBuilder<A> {
    fn default() -> Self {
        Self {
            adapter: None,
            schema_service: None,
            package_manager: None,
            code_runtime: None,
            store_options: StoreOptions::default(),
        }
    }
}

impl<A: RenderAdapter> RendererBuilder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adapter(mut self, adapter: A) -> Self {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    pub fn schema_service<F, S>(mut self, factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: SchemaService + 'static,
    {
        self.schema_service = Some(Arc::new(move || Arc::new(factory()) as Arc<dyn SchemaService>));
        self
    }

    pub fn package_manager<F, P>(mut self, factory: F) -> Self
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: PackageManager + 'static,
    {
        self.package_manager = Some(Arc::new(move || Arc::new(factory()) as Arc<dyn PackageManager>));
        self
    }

    pub fn code_runtime<F, C>(mut self, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: CodeRuntime + 'static,
    {
        self.code_runtime = Some(Arc::new(move || Arc::new(factory()) as Arc<dyn CodeRuntime>));
        self
    }

    /// Make every bootstrap's config store strict, gated by `validator`.
    pub fn config_validator<F, V>(mut self, validator: F) -> Self
    where
        F: Fn(&str, &Value) -> V + Send + Sync + 'static,
        V: Into<Validation>,
    {
        self.store_options = StoreOptions::strict(validator);
        self
    }

    pub fn store_options(mut self, options: StoreOptions) -> Self {
        self.store_options = options;
        self
    }

    /// Check the arguments and build. Fails before any options are seen.
    pub fn build(self) -> Result<Renderer<A>> {
        let adapter = self
            .adapter
            .ok_or_else(|| Error::Precondition("a render adapter is required".to_string()))?;
        if self.store_options.strict && self.store_options.validator.is_none() {
            return Err(Error::Precondition(
                "a strict configuration store requires a validator".to_string(),
            ));
        }

        Ok(Renderer {
            adapter,
            schema_service: self.schema_service.unwrap_or_else(default_schema_service),
            package_manager: self.package_manager.unwrap_or_else(default_package_manager),
            code_runtime: self.code_runtime.unwrap_or_else(default_code_runtime),
            store_options: self.store_options,
        })
    }
}
