//! Manifest file writing and update operations
//!
//! This module provides:
//! - ManifestWriter for applying a single version change to a project
//! - Dry-run mode support (no actual file modifications)
//! - Byte-preserving patches of the version attribute only

use super::{get_parser, ProjectManifest};
use crate::error::ManifestError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writer for manifest files that applies version updates
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of applying one version change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was rewritten
    Applied { manifest_path: PathBuf },
    /// The change would have been applied, but dry-run is active
    DryRun { manifest_path: PathBuf },
    /// No entry declares the package; the file was left untouched
    NotFound { manifest_path: PathBuf },
}

impl WriteOutcome {
    /// Returns true if the file on disk was modified
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied { .. })
    }

    /// Returns true if the target entry was missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, WriteOutcome::NotFound { .. })
    }

    /// Returns the file that was (or would have been) written
    pub fn manifest_path(&self) -> &Path {
        match self {
            WriteOutcome::Applied { manifest_path }
            | WriteOutcome::DryRun { manifest_path }
            | WriteOutcome::NotFound { manifest_path } => manifest_path,
        }
    }
}

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Create a ManifestWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Sets the version of `package_id` in the manifest of `project_path`
    ///
    /// The target file is chosen with the same rule used for reading, so a
    /// project with a sibling packages.config is patched there.
    pub fn apply_version(
        &self,
        project_path: &Path,
        package_id: &str,
        new_version: &str,
    ) -> Result<WriteOutcome, ManifestError> {
        let manifest = ProjectManifest::resolve(project_path)?;
        self.apply_to(&manifest, package_id, new_version)
    }

    /// Same as [`apply_version`](Self::apply_version) with an already resolved manifest
    pub fn apply_to(
        &self,
        manifest: &ProjectManifest,
        package_id: &str,
        new_version: &str,
    ) -> Result<WriteOutcome, ManifestError> {
        let path = &manifest.manifest_path;
        let content = read_manifest(path)?;
        let parser = get_parser(manifest.dialect);

        let Some(updated) = parser.update_version(path, &content, package_id, new_version)? else {
            warn!(
                package = package_id,
                manifest = %path.display(),
                "package entry not found at write time, nothing written"
            );
            return Ok(WriteOutcome::NotFound {
                manifest_path: path.clone(),
            });
        };

        if self.dry_run {
            debug!(package = package_id, version = new_version, "dry run, skipping write");
            return Ok(WriteOutcome::DryRun {
                manifest_path: path.clone(),
            });
        }

        write_manifest(path, &updated)?;
        debug!(
            package = package_id,
            version = new_version,
            manifest = %path.display(),
            "version written"
        );
        Ok(WriteOutcome::Applied {
            manifest_path: path.clone(),
        })
    }
}

/// Read a manifest file content safely
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a manifest file
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
}
