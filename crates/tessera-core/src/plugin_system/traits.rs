use async_trait::async_trait;

use crate::kernel::context::ServiceContext;
use crate::kernel::error::Result;
use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::version::VersionRange;

/// Core trait that all plugins must implement
///
/// `init` runs while the bootstrapper is between `Ready` and
/// `AfterInitPackageLoad` for initial plugins, so it must not wait on
/// `AfterInitPackageLoad` itself.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique name; a second plugin with the same name is not registered.
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "0.0.0"
    }

    /// Compatible API versions. Empty accepts every version.
    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        Vec::new()
    }

    fn dependencies(&self) -> Vec<PluginDependency> {
        Vec::new()
    }

    /// Activate the plugin against the assembled services
    async fn init(&self, context: &ServiceContext) -> Result<()>;

    async fn destroy(&self, _context: &ServiceContext) -> Result<()> {
        Ok(())
    }
}
