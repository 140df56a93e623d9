//! packages.config parser for classic .NET Framework projects

use super::{parse_entries, update_entry, ManifestParser};
use crate::domain::{Dependency, Dialect};
use crate::error::ManifestError;
use std::path::Path;

/// Parser for `<package id="..." version="..." />` entries
pub struct PackagesConfigParser;

impl ManifestParser for PackagesConfigParser {
    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        parse_entries(Dialect::PackagesConfig, path, content)
    }

    fn dialect(&self) -> Dialect {
        Dialect::PackagesConfig
    }

    fn update_version(
        &self,
        path: &Path,
        content: &str,
        package_id: &str,
        new_version: &str,
    ) -> Result<Option<String>, ManifestError> {
        update_entry(
            Dialect::PackagesConfig,
            path,
            content,
            package_id,
            new_version,
        )
    }
}
