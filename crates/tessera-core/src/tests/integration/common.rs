#![cfg(test)]

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{json, Value};

use crate::kernel::context::ServiceContext;
use crate::kernel::error::Result as KernelResult;
use crate::lifecycle::{LifecycleError, Phase};
use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::traits::Plugin;

pub fn order_schema() -> Value {
    json!({
        "version": "1.0.0",
        "componentsTree": [{
            "componentName": "Page",
            "id": "orders",
            "children": [
                { "componentName": "Table", "props": { "dataSource": "orders" } },
                { "componentName": "Pagination", "props": { "pageSize": 20 } }
            ]
        }]
    })
}

/// Plugin that writes a theme into the config store.
pub struct ThemePlugin;

#[async_trait]
impl Plugin for ThemePlugin {
    fn name(&self) -> &str {
        "theme"
    }

    fn version(&self) -> &str {
        "1.2.0"
    }

    async fn init(&self, context: &ServiceContext) -> KernelResult<()> {
        context.config().set("theme", json!({ "primary": "#1677ff" }));
        Ok(())
    }
}

/// Plugin that reads the theme and keeps watching the locale.
pub struct WidgetsPlugin {
    pub theme_seen: Arc<StdMutex<Option<Value>>>,
    pub locales: Arc<StdMutex<Vec<Value>>>,
    pub settled: StdMutex<Option<BoxFuture<'static, Result<(), LifecycleError>>>>,
}

impl WidgetsPlugin {
    pub fn new() -> Self {
        Self {
            theme_seen: Arc::new(StdMutex::new(None)),
            locales: Arc::new(StdMutex::new(Vec::new())),
            settled: StdMutex::new(None),
        }
    }
}

#[async_trait]
impl Plugin for WidgetsPlugin {
    fn name(&self) -> &str {
        "widgets"
    }

    fn dependencies(&self) -> Vec<PluginDependency> {
        vec![PluginDependency::required_any("theme")]
    }

    async fn init(&self, context: &ServiceContext) -> KernelResult<()> {
        // The theme plugin is activated first, so this resolves without waiting.
        let theme = context.config().once_got("theme").await?;
        *self.theme_seen.lock().unwrap() = Some(theme);

        let locales = Arc::clone(&self.locales);
        context
            .config()
            .on_got("locale", move |value| locales.lock().unwrap().push(value.clone()));

        *self.settled.lock().unwrap() = Some(context.lifecycle().when(Phase::AfterInitPackageLoad));
        Ok(())
    }
}
