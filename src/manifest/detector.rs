//! Input path detection
//!
//! Features:
//! - Accepts a solution, a project file, a packages.config or a directory
//! - Directories resolve to their first solution, else their project files,
//!   else their packages.config

use super::{is_packages_config, parse_solution};
use crate::domain::PACKAGES_CONFIG;
use crate::error::ManifestError;
use std::path::{Path, PathBuf};

/// Project file extensions handled as PackageReference projects
const PROJECT_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

/// What the user pointed the tool at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLocation {
    /// A single project file or packages.config
    Project(PathBuf),
    /// A solution file and the existing projects it references
    Solution { path: PathBuf, projects: Vec<PathBuf> },
    /// A directory without a solution, holding one or more project files
    Directory { path: PathBuf, projects: Vec<PathBuf> },
}

impl ManifestLocation {
    /// Returns the path this location was detected from
    pub fn path(&self) -> &Path {
        match self {
            ManifestLocation::Project(path) => path,
            ManifestLocation::Solution { path, .. } => path,
            ManifestLocation::Directory { path, .. } => path,
        }
    }

    /// Returns the projects to process, in order
    pub fn projects(&self) -> Vec<PathBuf> {
        match self {
            ManifestLocation::Project(path) => vec![path.clone()],
            ManifestLocation::Solution { projects, .. } => projects.clone(),
            ManifestLocation::Directory { projects, .. } => projects.clone(),
        }
    }

    /// Returns true for a solution aggregate
    pub fn is_solution(&self) -> bool {
        matches!(self, ManifestLocation::Solution { .. })
    }
}

/// Returns true if the path has a supported project file extension
pub fn is_project_file(path: &Path) -> bool {
    has_extension(path, PROJECT_EXTENSIONS)
}

fn is_solution_file(path: &Path) -> bool {
    has_extension(path, &["sln"])
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Detect what kind of input `path` is
pub fn detect_location(path: &Path) -> Result<ManifestLocation, ManifestError> {
    if path.is_dir() {
        return detect_in_directory(path);
    }
    if !path.exists() {
        return Err(ManifestError::not_found(path));
    }

    if is_solution_file(path) {
        let projects = parse_solution(path)?;
        return Ok(ManifestLocation::Solution {
            path: path.to_path_buf(),
            projects,
        });
    }

    if is_project_file(path) || is_packages_config(path) {
        return Ok(ManifestLocation::Project(path.to_path_buf()));
    }

    Err(ManifestError::unsupported(path))
}

fn detect_in_directory(dir: &Path) -> Result<ManifestLocation, ManifestError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| ManifestError::read_error(dir, e))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if let Some(solution) = files.iter().find(|p| is_solution_file(p)) {
        return detect_location(solution);
    }

    let projects: Vec<PathBuf> = files.into_iter().filter(|p| is_project_file(p)).collect();
    if !projects.is_empty() {
        return Ok(ManifestLocation::Directory {
            path: dir.to_path_buf(),
            projects,
        });
    }

    let config = dir.join(PACKAGES_CONFIG);
    if config.is_file() {
        return Ok(ManifestLocation::Project(config));
    }

    Err(ManifestError::unsupported(dir))
}
