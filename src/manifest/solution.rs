//! Solution (.sln) file parsing
//!
//! Only `Project(...)` lines are read. Entries are resolved relative to the
//! solution directory and kept only when they point at an existing project
//! file; solution folders and missing projects are dropped silently.

use super::{is_project_file, read_manifest};
use crate::error::ManifestError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// `Project("{type-guid}") = "Name", "relative\path.csproj", "{project-guid}"`
static PROJECT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Project\("\{[^}]*\}"\)\s*=\s*"[^"]*"\s*,\s*"([^"]*)"\s*,\s*"\{[^}]*\}""#)
        .expect("valid solution project regex")
});

/// Reads a solution file and returns the existing project files it references
pub fn parse_solution(path: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let content = read_manifest(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parse_solution_content(base, &content))
}

/// Resolves the project entries of solution `content` against `base`
pub fn parse_solution_content(base: &Path, content: &str) -> Vec<PathBuf> {
    let mut projects = Vec::new();

    for line in content.lines() {
        let Some(caps) = PROJECT_LINE_RE.captures(line) else {
            continue;
        };
        let relative = caps[1].replace('\\', "/");
        let resolved = base.join(&relative);

        if !resolved.is_file() {
            debug!(entry = %relative, "solution entry does not resolve to a file, skipping");
            continue;
        }
        if !is_project_file(&resolved) {
            debug!(entry = %relative, "solution entry is not a supported project type, skipping");
            continue;
        }
        if !projects.contains(&resolved) {
            projects.push(resolved);
        }
    }

    projects
}
