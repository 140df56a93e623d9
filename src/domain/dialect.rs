//! Manifest dialects supported for reading and writing

use serde::{Deserialize, Serialize};
use std::fmt;

/// File name of the packages-list manifest
pub(crate) const PACKAGES_CONFIG: &str = "packages.config";

/// The syntax a project uses to declare its packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `<PackageReference Include="..." Version="..." />` inside the project file
    PackageReference,
    /// `<package id="..." version="..." />` inside a sibling packages.config
    PackagesConfig,
}

impl Dialect {
    /// Returns the element name carrying a dependency
    pub fn element_name(&self) -> &'static str {
        match self {
            Dialect::PackageReference => "PackageReference",
            Dialect::PackagesConfig => "package",
        }
    }

    /// Returns the attribute holding the package identifier
    pub fn id_attribute(&self) -> &'static str {
        match self {
            Dialect::PackageReference => "Include",
            Dialect::PackagesConfig => "id",
        }
    }

    /// Returns the attribute holding the version
    pub fn version_attribute(&self) -> &'static str {
        match self {
            Dialect::PackageReference => "Version",
            Dialect::PackagesConfig => "version",
        }
    }

    /// Returns a human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::PackageReference => "PackageReference",
            Dialect::PackagesConfig => PACKAGES_CONFIG,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
