
use std::str::FromStr;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;

use crate::kernel::context::ServiceContext;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::traits::Plugin;
use crate::plugin_system::version::VersionRange;

/// Plugin double shared by the plugin system tests
pub(super) struct MockPlugin {
    id: String,
    version: String,
    deps: Vec<PluginDependency>,
    compatible_apis: Vec<VersionRange>,
    fail_init: bool,
    fail_destroy: bool,
    tracker: Arc<StdMutex<Vec<String>>>,
}

impl MockPlugin {
    pub(super) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            version: "1.0.0".to_string(),
            deps: Vec::new(),
            compatible_apis: Vec::new(),
            fail_init: false,
            fail_destroy: false,
            tracker: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    pub(super) fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub(super) fn depends_on(mut self, dep: PluginDependency) -> Self {
        self.deps.push(dep);
        self
    }

    pub(super) fn api(mut self, constraint: &str) -> Self {
        self.compatible_apis
            .push(VersionRange::from_str(constraint).expect("Valid constraint"));
        self
    }

    pub(super) fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub(super) fn failing_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    /// Records "init:<id>" and "destroy:<id>" events
    pub(super) fn tracked(mut self, tracker: &Arc<StdMutex<Vec<String>>>) -> Self {
        self.tracker = Arc::clone(tracker);
        self
    }

    pub(super) fn arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

#[async_trait]
impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        self.compatible_apis.clone()
    }

    fn dependencies(&self) -> Vec<PluginDependency> {
        self.deps.clone()
    }

    async fn init(&self, _context: &ServiceContext) -> Result<()> {
        self.tracker.lock().unwrap().push(format!("init:{}", self.id));
        if self.fail_init {
            return Err(Error::from(format!("{} refused to start", self.id)));
        }
        Ok(())
    }

    async fn destroy(&self, _context: &ServiceContext) -> Result<()> {
        self.tracker.lock().unwrap().push(format!("destroy:{}", self.id));
        if self.fail_destroy {
            return Err(Error::from("destroy failed"));
        }
        Ok(())
    }
}

pub(super) fn names(plugins: &[Arc<dyn Plugin>]) -> Vec<String> {
    plugins.iter().map(|p| p.name().to_string()).collect()
}
