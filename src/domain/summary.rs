//! Update result summary types
//!
//! Provides structures for tracking update results at project and run levels.

use super::{Dialect, UpdateDecision, UpdatePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Update result for a single project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdateResult {
    /// Path of the project as given or resolved from the solution
    pub path: PathBuf,
    /// File the dependencies were read from and written to
    pub manifest_path: PathBuf,
    /// Dialect of the manifest file
    pub dialect: Dialect,
    /// Per-dependency decisions in document order
    pub decisions: Vec<UpdateDecision>,
    /// Whether at least one version was written to disk
    pub changed: bool,
    /// Number of versions written to disk
    pub applied: usize,
    /// Package ids whose entry was gone at write time
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_targets: Vec<String>,
    /// Write failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub write_errors: Vec<String>,
}

impl ProjectUpdateResult {
    /// Creates a new ProjectUpdateResult
    pub fn new(
        path: impl Into<PathBuf>,
        manifest_path: impl Into<PathBuf>,
        dialect: Dialect,
    ) -> Self {
        Self {
            path: path.into(),
            manifest_path: manifest_path.into(),
            dialect,
            decisions: Vec::new(),
            changed: false,
            applied: 0,
            missing_targets: Vec::new(),
            write_errors: Vec::new(),
        }
    }

    /// Adds a decision
    pub fn add_decision(&mut self, decision: UpdateDecision) {
        self.decisions.push(decision);
    }

    /// Returns the number of update decisions
    pub fn update_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_update()).count()
    }

    /// Returns the number of skip decisions
    pub fn skip_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_skip()).count()
    }

    /// Returns all update decisions
    pub fn updates(&self) -> impl Iterator<Item = &UpdateDecision> {
        self.decisions.iter().filter(|d| d.is_update())
    }

    /// Returns all skip decisions
    pub fn skips(&self) -> impl Iterator<Item = &UpdateDecision> {
        self.decisions.iter().filter(|d| d.is_skip())
    }

    /// Returns true if any dependency has a selected version
    pub fn has_updates(&self) -> bool {
        self.update_count() > 0
    }

    /// Returns true if any write failed
    pub fn has_write_errors(&self) -> bool {
        !self.write_errors.is_empty()
    }
}

/// A project that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFailure {
    /// Path of the project
    pub path: PathBuf,
    /// Error description
    pub message: String,
}

impl ProjectFailure {
    /// Creates a new ProjectFailure
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Overall summary of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSummary {
    /// Policy the run was started with
    pub policy: UpdatePolicy,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Results for each processed project
    pub projects: Vec<ProjectUpdateResult>,
    /// Projects that failed to load or were interrupted
    pub failures: Vec<ProjectFailure>,
}

impl UpdateSummary {
    /// Creates a new UpdateSummary
    pub fn new(policy: UpdatePolicy, dry_run: bool) -> Self {
        Self {
            policy,
            dry_run,
            projects: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Adds a project result
    pub fn add_project(&mut self, project: ProjectUpdateResult) {
        self.projects.push(project);
    }

    /// Adds a project failure
    pub fn add_failure(&mut self, failure: ProjectFailure) {
        self.failures.push(failure);
    }

    /// Returns the number of projects processed successfully
    pub fn projects_processed(&self) -> usize {
        self.projects.len()
    }

    /// Returns the number of projects whose manifest was written
    pub fn projects_changed(&self) -> usize {
        self.projects.iter().filter(|p| p.changed).count()
    }

    /// Returns the total number of update decisions
    pub fn total_updates(&self) -> usize {
        self.projects.iter().map(|p| p.update_count()).sum()
    }

    /// Returns the total number of skip decisions
    pub fn total_skips(&self) -> usize {
        self.projects.iter().map(|p| p.skip_count()).sum()
    }

    /// Returns the total number of dependencies examined
    pub fn total_dependencies(&self) -> usize {
        self.projects.iter().map(|p| p.decisions.len()).sum()
    }

    /// Returns true if any project manifest was written
    pub fn has_changes(&self) -> bool {
        self.projects_changed() > 0
    }

    /// Returns true if a project failed or a write failed
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || self.projects.iter().any(|p| p.has_write_errors())
    }

    /// Returns the paths of projects that were written
    pub fn changed_projects(&self) -> impl Iterator<Item = &ProjectUpdateResult> {
        self.projects.iter().filter(|p| p.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, SemanticVersion, SkipReason};

    fn update(id: &str, from: &str, to: &str) -> UpdateDecision {
        UpdateDecision::update(
            Dependency::new(id, from),
            SemanticVersion::parse(to).unwrap(),
        )
    }

    fn skip(id: &str, version: &str) -> UpdateDecision {
        UpdateDecision::skip(Dependency::new(id, version), SkipReason::AlreadyLatest)
    }

    fn project(name: &str) -> ProjectUpdateResult {
        ProjectUpdateResult::new(name, name, Dialect::PackageReference)
    }

    #[test]
    fn test_project_result_counts() {
        let mut result = project("App.csproj");
        result.add_decision(update("Serilog", "2.10.0", "2.12.0"));
        result.add_decision(skip("xunit", "2.4.2"));
        result.add_decision(update("Polly", "7.0.0", "7.2.4"));

        assert_eq!(result.update_count(), 2);
        assert_eq!(result.skip_count(), 1);
        assert!(result.has_updates());
        assert_eq!(result.updates().count(), 2);
        assert_eq!(result.skips().count(), 1);
        assert!(!result.changed);
    }

    #[test]
    fn test_project_result_empty() {
        let result = project("App.csproj");
        assert!(!result.has_updates());
        assert!(!result.has_write_errors());
    }

    #[test]
    fn test_summary_totals() {
        let mut summary = UpdateSummary::new(UpdatePolicy::Minor, false);

        let mut a = project("A.csproj");
        a.add_decision(update("Serilog", "2.10.0", "2.12.0"));
        a.changed = true;
        a.applied = 1;
        summary.add_project(a);

        let mut b = project("B.csproj");
        b.add_decision(skip("xunit", "2.4.2"));
        summary.add_project(b);

        assert_eq!(summary.projects_processed(), 2);
        assert_eq!(summary.projects_changed(), 1);
        assert_eq!(summary.total_updates(), 1);
        assert_eq!(summary.total_skips(), 1);
        assert_eq!(summary.total_dependencies(), 2);
        assert!(summary.has_changes());
        assert!(!summary.has_errors());
        assert_eq!(summary.changed_projects().count(), 1);
    }

    #[test]
    fn test_summary_errors() {
        let mut summary = UpdateSummary::new(UpdatePolicy::Patch, false);
        summary.add_failure(ProjectFailure::new("Broken.csproj", "malformed"));
        assert!(summary.has_errors());

        let mut summary = UpdateSummary::new(UpdatePolicy::Patch, false);
        let mut p = project("App.csproj");
        p.write_errors.push("disk full".to_string());
        summary.add_project(p);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_serde_summary() {
        let mut summary = UpdateSummary::new(UpdatePolicy::Major, true);
        let mut p = project("App.csproj");
        p.add_decision(update("Serilog", "2.10.0", "3.0.1"));
        summary.add_project(p);

        let json = serde_json::to_string(&summary).unwrap();
        let parsed: UpdateSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }
}
