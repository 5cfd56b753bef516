
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::kernel::context::{RenderContext, ServiceContext};
use crate::kernel::error::{Error, Result};
use crate::lifecycle::Phase;
use crate::plugin_system::traits::Plugin;

/// Render object produced by the test adapters
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RenderObject {
    pub foo: u32,
    pub components: usize,
}

/// Adapter that records the phase and mode it observed
#[derive(Default)]
pub(super) struct RecordingAdapter {
    pub observed: StdMutex<Option<(Phase, Option<Value>)>>,
    pub fail: bool,
}

#[async_trait]
impl crate::kernel::adapter::RenderAdapter for RecordingAdapter {
    type Output = RenderObject;

    async fn render(&self, context: RenderContext) -> Result<RenderObject> {
        *self.observed.lock().unwrap() =
            Some((context.lifecycle().phase(), context.config().get("mode")));
        if self.fail {
            return Err(Error::from("adapter exploded"));
        }
        Ok(RenderObject {
            foo: 1,
            components: context.component_tree().node_count(),
        })
    }
}

/// Plugin that records the phase it was initialized in
pub(super) struct PhasePlugin {
    pub name: &'static str,
    pub seen: Arc<StdMutex<Vec<(String, Phase)>>>,
}

impl PhasePlugin {
    pub fn arc(name: &'static str, seen: &Arc<StdMutex<Vec<(String, Phase)>>>) -> Arc<dyn Plugin> {
        Arc::new(Self {
            name,
            seen: Arc::clone(seen),
        })
    }
}

#[async_trait]
impl Plugin for PhasePlugin {
    fn name(&self) -> &str {
        self.name
    }

    async fn init(&self, context: &ServiceContext) -> Result<()> {
        self.seen
            .lock()
            .unwrap()
            .push((self.name.to_string(), context.lifecycle().phase()));
        Ok(())
    }
}

pub(super) fn valid_schema() -> Value {
    json!({
        "version": "1.0.0",
        "componentsTree": [{
            "componentName": "Page",
            "children": [{ "componentName": "Text", "props": { "text": "Hello" } }]
        }]
    })
}
