#![cfg(test)]

use std::sync::Arc;

use serde_json::{json, Value};

use crate::kernel::adapter::{adapter_fn, RenderAdapter};
use crate::kernel::bootstrap::create_renderer;
use crate::kernel::options::{Mode, RendererOptions};
use crate::lifecycle::Phase;
use crate::services::package::PackageDescriptor;

use super::common::{order_schema, ThemePlugin};

#[tokio::test]
async fn test_end_to_end_render() {
    let renderer = create_renderer(adapter_fn(|_context| async { Ok(json!({ "foo": 1 })) }));

    let app = renderer
        .create(RendererOptions::new(order_schema()).with_plugin(Arc::new(ThemePlugin)))
        .await
        .expect("Bootstrap should succeed");

    assert_eq!(app["foo"], json!(1));
    assert_eq!(app.mode(), Mode::Production);
    assert_eq!(app.phase(), Phase::AfterInitPackageLoad);
    assert!(app.context().plugins().is_active("theme").await);
    assert_eq!(app.schema().get("componentsTree[0].id"), Some(json!("orders")));
    assert_eq!(app.context().component_tree().node_count(), 3);

    // A late plugin goes through the same host.
    app.use_plugin(Arc::new(ThemePlugin)).await.unwrap();
    assert_eq!(app.context().plugins().plugin_names().await, vec!["theme".to_string()]);
}

#[tokio::test]
async fn test_each_create_is_independent() {
    let renderer = create_renderer(adapter_fn(|context| async move {
        Ok(context.config().get("mode").unwrap_or(Value::Null))
    }));

    let dev = renderer
        .create(RendererOptions::new(order_schema()).with_mode(Mode::Development))
        .await
        .unwrap();
    let prod = renderer.create(RendererOptions::new(order_schema())).await.unwrap();

    assert_eq!(*dev, json!("development"));
    assert_eq!(*prod, json!("production"));
    assert!(!Arc::ptr_eq(dev.context().config(), prod.context().config()));
}

#[tokio::test]
async fn test_packages_load_before_app_is_available() {
    let renderer = create_renderer(adapter_fn(|_context| async { Ok(()) }));
    let app = renderer
        .create(
            RendererOptions::new(order_schema())
                .with_package(PackageDescriptor::new("antd").with_version("5.1.0"))
                .with_package(PackageDescriptor::new("dayjs").with_version("1.11.10")),
        )
        .await
        .unwrap();

    let loaded: Vec<String> = app.package_manager().loaded_packages().iter().map(PackageDescriptor::id).collect();
    assert_eq!(loaded, vec!["antd@5.1.0", "dayjs@1.11.10"]);
}

#[tokio::test]
async fn test_adapter_can_be_called_directly() {
    let adapter = adapter_fn(|context| async move { Ok(context.lifecycle().phase()) });
    let context = crate::kernel::context::ServiceContext::with_defaults().unwrap();
    assert_eq!(adapter.render(context).await.unwrap(), Phase::Uninitialized);
}
