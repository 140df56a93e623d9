//! Manifest file detection and parsing
//!
//! This module provides functionality to:
//! - Resolve a project to the file that actually declares its packages
//! - Parse PackageReference items and packages.config entries
//! - Enumerate the projects of a solution file
//! - Patch a single version attribute in place

mod detector;
mod package_reference;
mod packages_config;
mod solution;
mod writer;
mod xml;

pub use detector::{detect_location, is_project_file, ManifestLocation};
pub use package_reference::{target_frameworks, PackageReferenceParser};
pub use packages_config::PackagesConfigParser;
pub use solution::{parse_solution, parse_solution_content};
pub use writer::{read_manifest, write_manifest, ManifestWriter, WriteOutcome};

use crate::domain::{Dependency, Dialect, PACKAGES_CONFIG};
use crate::error::ManifestError;
use std::path::{Path, PathBuf};

/// Trait for parsing and patching manifest files
pub trait ManifestParser: Send + Sync {
    /// Parse dependencies from manifest content, in document order
    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Dependency>, ManifestError>;

    /// Returns the dialect this parser handles
    fn dialect(&self) -> Dialect;

    /// Replace the version of the first entry declaring `package_id`
    ///
    /// Returns `Ok(None)` when no entry declares the package.
    fn update_version(
        &self,
        path: &Path,
        content: &str,
        package_id: &str,
        new_version: &str,
    ) -> Result<Option<String>, ManifestError>;
}

/// Get a manifest parser for the specified dialect
pub fn get_parser(dialect: Dialect) -> Box<dyn ManifestParser> {
    match dialect {
        Dialect::PackageReference => Box::new(PackageReferenceParser),
        Dialect::PackagesConfig => Box::new(PackagesConfigParser),
    }
}

/// A project together with the file its dependencies live in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectManifest {
    /// The project path as given (project file or packages.config)
    pub project_path: PathBuf,
    /// The file read from and written to
    pub manifest_path: PathBuf,
    /// Dialect of `manifest_path`
    pub dialect: Dialect,
}

impl ProjectManifest {
    /// Decides which file holds the dependencies of a project
    ///
    /// A `packages.config` next to the project file takes priority over any
    /// PackageReference items in the project itself. Reading and writing both
    /// go through this function, so they always agree on the target file.
    pub fn resolve(project_path: &Path) -> Result<Self, ManifestError> {
        if !project_path.is_file() {
            return Err(ManifestError::not_found(project_path));
        }

        if is_packages_config(project_path) {
            return Ok(Self {
                project_path: project_path.to_path_buf(),
                manifest_path: project_path.to_path_buf(),
                dialect: Dialect::PackagesConfig,
            });
        }

        if !is_project_file(project_path) {
            return Err(ManifestError::unsupported(project_path));
        }

        let sibling = project_path
            .parent()
            .map(|dir| dir.join(PACKAGES_CONFIG))
            .filter(|p| p.is_file());

        Ok(match sibling {
            Some(config) => Self {
                project_path: project_path.to_path_buf(),
                manifest_path: config,
                dialect: Dialect::PackagesConfig,
            },
            None => Self {
                project_path: project_path.to_path_buf(),
                manifest_path: project_path.to_path_buf(),
                dialect: Dialect::PackageReference,
            },
        })
    }

    /// Reads and parses the dependencies of this project
    pub fn load(&self) -> Result<Vec<Dependency>, ManifestError> {
        let content = read_manifest(&self.manifest_path)?;
        get_parser(self.dialect).parse(&self.manifest_path, &content)
    }
}

/// Parse dependencies of a project path, honouring packages.config priority
pub fn parse_manifest(project_path: &Path) -> Result<Vec<Dependency>, ManifestError> {
    ProjectManifest::resolve(project_path)?.load()
}

/// Returns true if the file name is `packages.config` (any case)
pub fn is_packages_config(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.eq_ignore_ascii_case(PACKAGES_CONFIG))
        .unwrap_or(false)
}

/// Parses every element of `dialect` that has both a non-empty identifier and
/// a non-empty version
fn parse_entries(
    dialect: Dialect,
    path: &Path,
    content: &str,
) -> Result<Vec<Dependency>, ManifestError> {
    let elements = xml::find_elements(content, dialect.element_name())
        .map_err(|message| ManifestError::xml_parse_error(path, message))?;

    let dependencies = elements
        .iter()
        .filter_map(|element| {
            let id = element.non_empty_value(dialect.id_attribute())?;
            let version = element.non_empty_value(dialect.version_attribute())?;
            Some(Dependency::new(id.trim(), version.trim()))
        })
        .collect();

    Ok(dependencies)
}

/// Splices `new_version` into the version attribute of the first entry that
/// `parse_entries` would report for `package_id`
fn update_entry(
    dialect: Dialect,
    path: &Path,
    content: &str,
    package_id: &str,
    new_version: &str,
) -> Result<Option<String>, ManifestError> {
    let elements = xml::find_elements(content, dialect.element_name())
        .map_err(|message| ManifestError::xml_parse_error(path, message))?;

    let target = elements.iter().find_map(|element| {
        let id = element.non_empty_value(dialect.id_attribute())?;
        if id.trim() != package_id {
            return None;
        }
        element.non_empty_value(dialect.version_attribute())?;
        element.attribute(dialect.version_attribute())
    });

    Ok(target.map(|attr| xml::replace_value(content, attr.value_range.clone(), new_version)))
}
