#![cfg(test)]

use std::sync::Arc;

use serde_json::json;

use crate::kernel::adapter::adapter_fn;
use crate::kernel::bootstrap::create_renderer;
use crate::kernel::error::Error;
use crate::kernel::options::RendererOptions;
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::error::PluginSystemError;

use super::common::{order_schema, ThemePlugin, WidgetsPlugin};

#[tokio::test]
async fn test_plugins_share_config_across_activation() {
    let widgets = Arc::new(WidgetsPlugin::new());
    let renderer = create_renderer(adapter_fn(|_context| async { Ok(()) }));

    // Dependents may be listed first; the host orders them.
    let app = renderer
        .create(
            RendererOptions::new(order_schema())
                .with_plugin(widgets.clone())
                .with_plugin(Arc::new(ThemePlugin))
                .with_config("locale", json!("en-US")),
        )
        .await
        .expect("Bootstrap should succeed");

    assert_eq!(
        *widgets.theme_seen.lock().unwrap(),
        Some(json!({ "primary": "#1677ff" }))
    );
    assert_eq!(*widgets.locales.lock().unwrap(), vec![json!("en-US")]);

    app.context().config().set("locale", json!("de-DE"));
    assert_eq!(*widgets.locales.lock().unwrap(), vec![json!("en-US"), json!("de-DE")]);

    let settled = widgets.settled.lock().unwrap().take().expect("Waiter registered during init");
    settled.await.expect("Lifecycle wait registered during init resolves");
}

#[tokio::test]
async fn test_missing_plugin_dependency_fails_bootstrap() {
    let renderer = create_renderer(adapter_fn(|_context| async { Ok(()) }));
    let result = renderer
        .create(RendererOptions::new(order_schema()).with_plugin(Arc::new(WidgetsPlugin::new())))
        .await;

    assert!(matches!(
        result,
        Err(Error::PluginSystem(PluginSystemError::DependencyResolution(
            DependencyError::MissingPlugin { .. }
        )))
    ));
}
