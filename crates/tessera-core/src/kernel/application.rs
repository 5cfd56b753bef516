use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::kernel::context::ServiceContext;
use crate::kernel::error::{Error, Result};
use crate::kernel::options::{Mode, OptionsSnapshot};
use crate::lifecycle::Phase;
use crate::plugin_system::traits::Plugin;
use crate::services::package::PackageManager;
use crate::services::schema::SchemaService;

struct ApplicationInner<R> {
    mode: Mode,
    options: OptionsSnapshot,
    context: ServiceContext,
    render: Arc<R>,
}

/// The finished application: metadata, service handles and the adapter's
/// render object.
///
/// Immutable once built. Clones share the same value. The render object is
/// reachable through [`render`](Self::render) or by deref.
pub struct RendererApplication<R> {
    inner: Arc<ApplicationInner<R>>,
}

impl<R> Clone for RendererApplication<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Send + Sync + 'static> RendererApplication<R> {
    pub fn mode(&self) -> Mode {
        self.inner.mode
    }

    pub fn schema(&self) -> &Arc<dyn SchemaService> {
        self.inner.context.schema()
    }

    pub fn package_manager(&self) -> &Arc<dyn PackageManager> {
        self.inner.context.package_manager()
    }

    pub fn render(&self) -> &R {
        &self.inner.render
    }

    pub fn context(&self) -> &ServiceContext {
        &self.inner.context
    }

    pub fn phase(&self) -> Phase {
        self.inner.context.lifecycle().phase()
    }

    /// Options the application was bootstrapped with; diagnostics only.
    #[doc(hidden)]
    pub fn options(&self) -> &OptionsSnapshot {
        &self.inner.options
    }

    /// Register and activate a plugin on the running application. A plugin
    /// whose name is already registered is skipped.
    pub async fn use_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let context = &self.inner.context;
        context.plugins().register_plugin(plugin, context).await?;
        Ok(())
    }
}

impl<R> Deref for RendererApplication<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.inner.render
    }
}

impl<R: fmt::Debug> fmt::Debug for RendererApplication<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererApplication")
            .field("mode", &self.inner.mode)
            .field("render", &self.inner.render)
            .field("context", &self.inner.context)
            .finish()
    }
}

/// Assembles a [`RendererApplication`]; every part is required.
pub struct ApplicationBuilder<R> {
    mode: Option<Mode>,
    options: Option<OptionsSnapshot>,
    context: Option<ServiceContext>,
    render: Option<Arc<R>>,
}

impl<R> Default for ApplicationBuilder<R> {
    fn default() -> Self {
        Self {
            mode: None,
            options: None,
            context: None,
            render: None,
        }
    }
}

impl<R> ApplicationBuilder<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also sets the mode, unless one was given explicitly.
    pub fn options(mut self, options: OptionsSnapshot) -> Self {
        self.mode.get_or_insert(options.mode);
        self.options = Some(options);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn context(mut self, context: ServiceContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn render(mut self, render: Arc<R>) -> Self {
        self.render = Some(render);
        self
    }

    pub fn build(self) -> Result<RendererApplication<R>> {
        let missing = |part: &str| Error::Precondition(format!("application {} is missing", part));
        Ok(RendererApplication {
            inner: Arc::new(ApplicationInner {
                mode: self.mode.ok_or_else(|| missing("mode"))?,
                options: self.options.ok_or_else(|| missing("options"))?,
                context: self.context.ok_or_else(|| missing("context"))?,
                render: self.render.ok_or_else(|| missing("render object"))?,
            }),
        })
    }
}
