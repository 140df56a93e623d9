//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of a run
//! - Structured project-by-project update/skip information

use crate::domain::{ProjectUpdateResult, SkipReason, UpdateDecision, UpdateSummary};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput {
    /// Whether this was a dry-run
    dry_run: bool,
    /// Policy of the run
    policy: String,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-project results
    projects: Vec<JsonProject>,
    /// Projects that could not be processed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonSummary {
    projects: usize,
    changed: usize,
    failed: usize,
    updates: usize,
    skips: usize,
}

#[derive(Serialize)]
struct JsonProject {
    path: String,
    manifest: String,
    dialect: String,
    changed: bool,
    updates: Vec<JsonUpdate>,
    /// Only in verbose mode
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skips: Vec<JsonSkip>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_targets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    write_errors: Vec<String>,
}

#[derive(Serialize)]
struct JsonUpdate {
    package: String,
    from: String,
    to: String,
}

#[derive(Serialize)]
struct JsonSkip {
    package: String,
    version: String,
    reason: String,
}

#[derive(Serialize)]
struct JsonFailure {
    path: String,
    message: String,
}

impl JsonFormatter {
    /// Convert skip reason to string
    fn skip_reason_to_string(reason: &SkipReason) -> String {
        match reason {
            SkipReason::AlreadyLatest => "already_latest".to_string(),
            SkipReason::NoVersionsFound => "no_versions_found".to_string(),
            SkipReason::Excluded => "excluded".to_string(),
            SkipReason::NotInOnlyList => "not_in_only_list".to_string(),
            SkipReason::DuplicateEntry => "duplicate_entry".to_string(),
            SkipReason::FetchFailed(msg) => format!("fetch_failed: {}", msg),
            SkipReason::InvalidVersion(msg) => format!("invalid_version: {}", msg),
        }
    }

    fn project_to_json(&self, project: &ProjectUpdateResult) -> JsonProject {
        let updates = project
            .decisions
            .iter()
            .filter_map(|decision| match decision {
                UpdateDecision::Update {
                    dependency,
                    new_version,
                } => Some(JsonUpdate {
                    package: dependency.package_id.clone(),
                    from: dependency.version.clone(),
                    to: new_version.to_string(),
                }),
                UpdateDecision::Skip { .. } => None,
            })
            .collect();

        let skips = if self.verbosity == Verbosity::Verbose {
            project
                .decisions
                .iter()
                .filter_map(|decision| match decision {
                    UpdateDecision::Skip { dependency, reason } => Some(JsonSkip {
                        package: dependency.package_id.clone(),
                        version: dependency.version.clone(),
                        reason: Self::skip_reason_to_string(reason),
                    }),
                    UpdateDecision::Update { .. } => None,
                })
                .collect()
        } else {
            Vec::new()
        };

        JsonProject {
            path: project.path.display().to_string(),
            manifest: project.manifest_path.display().to_string(),
            dialect: project.dialect.display_name().to_string(),
            changed: project.changed,
            updates,
            skips,
            missing_targets: project.missing_targets.clone(),
            write_errors: project.write_errors.clone(),
        }
    }

    fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &UpdateSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            dry_run: summary.dry_run,
            policy: summary.policy.to_string(),
            summary: JsonSummary {
                projects: summary.projects_processed(),
                changed: summary.projects_changed(),
                failed: summary.failures.len(),
                updates: summary.total_updates(),
                skips: summary.total_skips(),
            },
            projects: summary
                .projects
                .iter()
                .map(|p| self.project_to_json(p))
                .collect(),
            failures: summary
                .failures
                .iter()
                .map(|f| JsonFailure {
                    path: f.path.display().to_string(),
                    message: f.message.clone(),
                })
                .collect(),
        };

        Self::write_json(&output, writer)
    }

    fn format_project(
        &self,
        project: &ProjectUpdateResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(&self.project_to_json(project), writer)
    }
}
