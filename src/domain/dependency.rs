//! Dependency information structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// A package dependency as declared in a manifest
///
/// Both fields are kept exactly as they appear in the document. The version
/// stays an opaque string until the policy evaluator parses it, so entries
/// with floating versions or ranges survive loading and are reported later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Package identifier (case-sensitive, never empty)
    pub package_id: String,
    /// Version string as written in the manifest
    pub version: String,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(package_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            version: version.into(),
        }
    }

    /// Returns a new dependency with the same identifier and another version
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self::new(self.package_id.clone(), version)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package_id, self.version)
    }
}
