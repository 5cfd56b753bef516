use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::services::error::ServiceError;

/// A package the application depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    /// Global name the package exposes once loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
}

impl PackageDescriptor {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: None,
            urls: Vec::new(),
            library: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }

    /// `package@version`, or just `package` when unversioned
    pub fn id(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.package, version),
            None => self.package.clone(),
        }
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if self.package.trim().is_empty() {
            return Err(ServiceError::InvalidPackage {
                package: self.package.clone(),
                reason: "package name is empty".to_string(),
            });
        }
        if let Some(version) = &self.version {
            semver::Version::parse(version).map_err(|e| ServiceError::InvalidPackage {
                package: self.package.clone(),
                reason: format!("invalid version '{}': {}", version, e),
            })?;
        }
        Ok(())
    }
}

/// Loads the packages an application declares
#[async_trait]
pub trait PackageManager: Send + Sync + fmt::Debug {
    async fn load_packages(&self, packages: Vec<PackageDescriptor>) -> Result<(), ServiceError>;

    /// Loaded packages in load order
    fn loaded_packages(&self) -> Vec<PackageDescriptor>;
}

/// Records package descriptors without fetching anything.
///
/// A call validates the whole list before recording any of it. Descriptors
/// already loaded (same package and version) are skipped.
#[derive(Default)]
pub struct DefaultPackageManager {
    loaded: Mutex<Vec<PackageDescriptor>>,
}

impl DefaultPackageManager {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PackageManager for DefaultPackageManager {
    async fn load_packages(&self, packages: Vec<PackageDescriptor>) -> Result<(), ServiceError> {
        for descriptor in &packages {
            descriptor.validate()?;
        }

        let mut loaded = self.loaded.lock();
        for descriptor in packages {
            let duplicate = loaded
                .iter()
                .any(|p| p.package == descriptor.package && p.version == descriptor.version);
            if duplicate {
                log::debug!("Package '{}' is already loaded, skipping", descriptor.id());
                continue;
            }
            log::info!("Loaded package '{}'", descriptor.id());
            loaded.push(descriptor);
        }
        Ok(())
    }

    fn loaded_packages(&self) -> Vec<PackageDescriptor> {
        self.loaded.lock().clone()
    }
}

impl fmt::Debug for DefaultPackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultPackageManager")
            .field("loaded", &self.loaded.lock().len())
            .finish()
    }
}
