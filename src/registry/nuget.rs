//! NuGet v3 feed adapter
//!
//! Version lookup goes through the package base address (flat container):
//! 1. `GET {service-index}` lists the feed's resources; the
//!    `PackageBaseAddress/3.0.0` entry is remembered for the adapter's lifetime.
//! 2. `GET {base}/{id-lowercase}/index.json` returns `{"versions": [...]}`.

use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

/// Service index of nuget.org
pub const DEFAULT_FEED_URL: &str = "https://api.nuget.org/v3/index.json";

/// Resource type providing the flat container
const PACKAGE_BASE_ADDRESS: &str = "PackageBaseAddress/3.0.0";

const REGISTRY_NAME: &str = "NuGet";

/// Adapter for a NuGet v3 feed
pub struct NuGetAdapter {
    client: HttpClient,
    service_index_url: String,
    base_address: OnceCell<String>,
}

/// Service index document
#[derive(Debug, Deserialize)]
struct ServiceIndex {
    #[serde(default)]
    resources: Vec<ServiceResource>,
}

/// One entry of the service index
#[derive(Debug, Deserialize)]
struct ServiceResource {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    resource_type: String,
}

/// Flat container version list
#[derive(Debug, Deserialize)]
struct VersionIndex {
    #[serde(default)]
    versions: Vec<String>,
}

impl NuGetAdapter {
    /// Create an adapter for the feed whose service index is at `service_index_url`
    pub fn new(client: HttpClient, service_index_url: impl Into<String>) -> Self {
        Self {
            client,
            service_index_url: service_index_url.into(),
            base_address: OnceCell::new(),
        }
    }

    /// Create an adapter for nuget.org
    pub fn nuget_org(client: HttpClient) -> Self {
        Self::new(client, DEFAULT_FEED_URL)
    }

    /// Returns the service index URL
    pub fn service_index_url(&self) -> &str {
        &self.service_index_url
    }

    /// Resolves (once) the package base address advertised by the feed
    async fn base_address(&self) -> Result<&str, RegistryError> {
        let base = self
            .base_address
            .get_or_try_init(|| async {
                let index: ServiceIndex = self
                    .client
                    .get_json(&self.service_index_url, "", REGISTRY_NAME)
                    .await
                    .map_err(|e| match e {
                        RegistryError::PackageNotFound { .. } => RegistryError::network_error(
                            "",
                            REGISTRY_NAME,
                            format!("service index {} not found", self.service_index_url),
                        ),
                        other => other,
                    })?;

                let base = find_base_address(&index).ok_or_else(|| {
                    RegistryError::MissingResource {
                        url: self.service_index_url.clone(),
                        resource: PACKAGE_BASE_ADDRESS.to_string(),
                    }
                })?;
                debug!(base = %base, "resolved package base address");
                Ok::<String, RegistryError>(base)
            })
            .await?;
        Ok(base.as_str())
    }

    fn versions_url(base: &str, package_id: &str) -> String {
        format!(
            "{}/{}/index.json",
            base.trim_end_matches('/'),
            package_id.to_lowercase()
        )
    }
}

fn find_base_address(index: &ServiceIndex) -> Option<String> {
    index
        .resources
        .iter()
        .find(|r| r.resource_type == PACKAGE_BASE_ADDRESS)
        .map(|r| r.id.trim_end_matches('/').to_string())
}

#[async_trait]
impl RegistryAdapter for NuGetAdapter {
    fn registry_name(&self) -> &str {
        REGISTRY_NAME
    }

    async fn get_all_versions(&self, package_id: &str) -> Result<Vec<String>, RegistryError> {
        let base = self.base_address().await?;
        let url = Self::versions_url(base, package_id);
        let index: VersionIndex = self
            .client
            .get_json(&url, package_id, REGISTRY_NAME)
            .await?;
        debug!(package = package_id, count = index.versions.len(), "fetched versions");
        Ok(index.versions)
    }
}
