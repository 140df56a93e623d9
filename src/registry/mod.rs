//! Registry adapters for fetching package version information
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - NuGet v3 feed adapter

mod client;
mod nuget;

pub use client::HttpClient;
pub use nuget::{NuGetAdapter, DEFAULT_FEED_URL};

use crate::error::RegistryError;
use async_trait::async_trait;

/// Trait for registry adapters
///
/// Implementations must be safe to call concurrently; the orchestrator runs
/// one lookup per dependency in parallel.
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &str;

    /// Fetch every published version string of a package, in feed order
    async fn get_all_versions(&self, package_id: &str) -> Result<Vec<String>, RegistryError>;
}
