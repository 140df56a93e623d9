//! Package restore after updates
//!
//! This module provides:
//! - Selection of the restore command for a project (dotnet or msbuild)
//! - Execution of the restore command for each changed project

use crate::manifest::{is_packages_config, is_project_file, read_manifest, target_frameworks};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info, warn};

/// Result of a restore run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreResult {
    /// The project that was restored
    pub project: PathBuf,
    /// The command that was executed (empty when skipped)
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl RestoreResult {
    /// Create a successful restore result
    pub fn success(project: impl Into<PathBuf>, command: String, stdout: String, stderr: String) -> Self {
        Self {
            project: project.into(),
            command,
            success: true,
            stdout,
            stderr,
        }
    }

    /// Create a failed restore result
    pub fn failure(project: impl Into<PathBuf>, command: String, stdout: String, stderr: String) -> Self {
        Self {
            project: project.into(),
            command,
            success: false,
            stdout,
            stderr,
        }
    }

    /// Create a skipped result (no project file to restore)
    pub fn skipped(project: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            command: String::new(),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Returns true if no command was run
    pub fn is_skipped(&self) -> bool {
        self.command.is_empty()
    }
}

/// Trait for running restore commands
pub trait RestoreRunner {
    /// Restore the packages of a project
    fn restore(&self, project: &Path) -> RestoreResult;
}

/// Restore runner that executes `dotnet` or `msbuild`
#[derive(Debug, Default)]
pub struct SystemRestore;

impl SystemRestore {
    /// Create a new system restore runner
    pub fn new() -> Self {
        Self
    }

    /// Build the restore command line for a project file
    ///
    /// SDK-style projects declare a `TargetFramework(s)` starting with `net`
    /// and restore with `dotnet`; everything else goes through `msbuild`.
    pub fn restore_command(&self, project_file: &Path) -> Vec<String> {
        let project = project_file.display().to_string();
        let is_sdk_style = read_manifest(project_file)
            .map(|content| {
                target_frameworks(&content)
                    .iter()
                    .any(|tfm| tfm.to_ascii_lowercase().starts_with("net"))
            })
            .unwrap_or(false);

        if is_sdk_style {
            vec!["dotnet".to_string(), "restore".to_string(), project]
        } else {
            vec!["msbuild".to_string(), project, "/restore".to_string()]
        }
    }

    /// Run a command and capture output
    fn run_command(&self, command: &[String]) -> std::io::Result<Output> {
        let Some((program, args)) = command.split_first() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty command",
            ));
        };
        Command::new(program).args(args).output()
    }
}

/// Returns the project file owning `path`
///
/// A packages.config belongs to the first project file in its directory.
pub fn owning_project(path: &Path) -> Option<PathBuf> {
    if is_project_file(path) {
        return Some(path.to_path_buf());
    }
    if !is_packages_config(path) {
        return None;
    }

    let dir = path.parent()?;
    let mut projects: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_project_file(p))
        .collect();
    projects.sort();
    projects.into_iter().next()
}

impl RestoreRunner for SystemRestore {
    fn restore(&self, project: &Path) -> RestoreResult {
        let Some(project_file) = owning_project(project) else {
            debug!(project = %project.display(), "no project file to restore");
            return RestoreResult::skipped(project);
        };

        let command = self.restore_command(&project_file);
        let command_str = command.join(" ");
        info!(command = %command_str, "restoring packages");

        match self.run_command(&command) {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    RestoreResult::success(project, command_str, stdout, stderr)
                } else {
                    warn!(command = %command_str, status = %output.status, "restore failed");
                    RestoreResult::failure(project, command_str, stdout, stderr)
                }
            }
            Err(e) => {
                warn!(command = %command_str, error = %e, "restore command could not be started");
                RestoreResult::failure(
                    project,
                    command_str,
                    String::new(),
                    format!("failed to execute command: {}", e),
                )
            }
        }
    }
}

/// Run restore for every project in `projects`
pub fn run_restores<R: RestoreRunner + ?Sized>(runner: &R, projects: &[PathBuf]) -> Vec<RestoreResult> {
    projects.iter().map(|p| runner.restore(p)).collect()
}
