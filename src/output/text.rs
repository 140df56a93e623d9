//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-project update lists with colors
//! - Semantic version change type indication (major/minor/patch)
//! - Skipped package display with reasons (verbose)
//! - Write problems and failed projects
//! - Summary with a breakdown by change type

use crate::domain::{
    ProjectUpdateResult, SemanticVersion, SkipReason, UpdateDecision, UpdateSummary,
};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch or revision change (fixes)
    Patch,
    /// Current version could not be parsed
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type from a declared version to the selected one
    pub fn between(old: &str, new: &SemanticVersion) -> Self {
        match SemanticVersion::parse(old) {
            Ok(old) if new.major != old.major => VersionChangeType::Major,
            Ok(old) if new.minor != old.minor => VersionChangeType::Minor,
            Ok(_) => VersionChangeType::Patch,
            Err(_) => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    fn dry_run_prefix(&self) -> String {
        if !self.dry_run {
            String::new()
        } else if self.color {
            format!("{} ", "(dry-run)".cyan())
        } else {
            "(dry-run) ".to_string()
        }
    }

    /// Short label for a skip reason
    fn format_skip_reason(reason: &SkipReason) -> String {
        match reason {
            SkipReason::AlreadyLatest => "latest".to_string(),
            SkipReason::NoVersionsFound => "no versions".to_string(),
            SkipReason::Excluded => "excluded".to_string(),
            SkipReason::NotInOnlyList => "not in --only".to_string(),
            SkipReason::DuplicateEntry => "duplicate entry".to_string(),
            SkipReason::FetchFailed(msg) => format!("fetch failed: {}", msg),
            SkipReason::InvalidVersion(msg) => format!("invalid version: {}", msg),
        }
    }

    fn max_name_length<'a>(decisions: impl Iterator<Item = &'a UpdateDecision>) -> usize {
        decisions.map(|d| d.package_id().len()).max().unwrap_or(0).max(20)
    }

    fn format_update_line(
        &self,
        decision: &UpdateDecision,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let UpdateDecision::Update {
            dependency,
            new_version,
        } = decision
        else {
            return Ok(());
        };
        let change = VersionChangeType::between(&dependency.version, new_version);

        if self.color {
            writeln!(
                writer,
                "  {} {} {} {} [{}]",
                format!("{:width$}", dependency.package_id, width = width),
                dependency.version.dimmed(),
                "→".dimmed(),
                new_version.as_str().bright_white().bold(),
                change.colored_label()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]",
                dependency.package_id,
                dependency.version,
                new_version,
                change.label(),
                width = width
            )
        }
    }

    fn format_skip_line(
        &self,
        decision: &UpdateDecision,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let Some(reason) = decision.skip_reason() else {
            return Ok(());
        };
        let line = format!(
            "{:width$} {} ({})",
            decision.package_id(),
            decision.dependency().version,
            Self::format_skip_reason(reason),
            width = width
        );
        if self.color {
            writeln!(writer, "  {}", line.dimmed())
        } else {
            writeln!(writer, "  {}", line)
        }
    }

    fn format_problems(
        &self,
        project: &ProjectUpdateResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for package in &project.missing_targets {
            let line = format!("{}: entry no longer present, not written", package);
            if self.color {
                writeln!(writer, "  {} {}", "!".yellow(), line)?;
            } else {
                writeln!(writer, "  ! {}", line)?;
            }
        }
        for error in &project.write_errors {
            if self.color {
                writeln!(writer, "  {} {}", "✗".red(), error)?;
            } else {
                writeln!(writer, "  - {}", error)?;
            }
        }
        Ok(())
    }

    fn count_by_change_type(summary: &UpdateSummary) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for decision in summary.projects.iter().flat_map(|p| p.updates()) {
            if let UpdateDecision::Update {
                dependency,
                new_version,
            } = decision
            {
                let label = VersionChangeType::between(&dependency.version, new_version).label();
                *counts.entry(label).or_insert(0) += 1;
            }
        }
        counts
    }

    fn format_failures(
        &self,
        summary: &UpdateSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if summary.failures.is_empty() {
            return Ok(());
        }

        if self.color {
            writeln!(writer, "{}:", "Errors".red().bold())?;
        } else {
            writeln!(writer, "Errors:")?;
        }
        for failure in &summary.failures {
            if self.color {
                writeln!(
                    writer,
                    "  {} {}: {}",
                    "✗".red(),
                    failure.path.display(),
                    failure.message
                )?;
            } else {
                writeln!(writer, "  - {}: {}", failure.path.display(), failure.message)?;
            }
        }
        writeln!(writer)
    }

    fn format_summary(
        &self,
        summary: &UpdateSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let updates = summary.total_updates();
        let skips = summary.total_skips();

        if self.verbosity == Verbosity::Quiet {
            return match (updates, self.color) {
                (0, true) => writeln!(writer, "{}{}", prefix, "No updates".dimmed()),
                (0, false) => writeln!(writer, "{}No updates", prefix),
                (n, true) => writeln!(writer, "{}{} updated", prefix, n.to_string().green()),
                (n, false) => writeln!(writer, "{}{} updated", prefix, n),
            };
        }

        let breakdown: Vec<String> = Self::count_by_change_type(summary)
            .into_iter()
            .map(|(label, count)| format!("{} {}", count, label))
            .collect();

        if self.color {
            writeln!(writer, "{}{} ({}):", prefix, "Summary".bold(), summary.policy)?;
        } else {
            writeln!(writer, "{}Summary ({}):", prefix, summary.policy)?;
        }

        if updates > 0 {
            writeln!(
                writer,
                "  {} package(s) updated ({})",
                updates,
                breakdown.join(", ")
            )?;
        } else {
            writeln!(writer, "  No packages updated")?;
        }
        writeln!(writer, "  {} package(s) skipped", skips)?;
        writeln!(
            writer,
            "  {} of {} project(s) changed",
            summary.projects_changed(),
            summary.projects_processed()
        )?;
        if !summary.failures.is_empty() {
            writeln!(writer, "  {} project(s) failed", summary.failures.len())?;
        }

        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &UpdateSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity != Verbosity::Quiet {
            for project in &summary.projects {
                self.format_project(project, writer)?;
            }
            self.format_failures(summary, writer)?;
        }

        self.format_summary(summary, writer)
    }

    fn format_project(
        &self,
        project: &ProjectUpdateResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let verbose = self.verbosity == Verbosity::Verbose;
        let has_problems = !project.missing_targets.is_empty() || project.has_write_errors();
        if !project.has_updates() && !has_problems && !verbose {
            return Ok(());
        }

        let update_count = project.update_count();
        let skip_count = project.skip_count();
        let path_display = project.path.display().to_string();
        let prefix = self.dry_run_prefix();

        if self.color {
            writeln!(
                writer,
                "{}{} {}: {} {}, {} {}",
                prefix,
                path_display.bold(),
                format!("({})", project.dialect).dimmed(),
                update_count.to_string().green(),
                if update_count == 1 { "update" } else { "updates" },
                skip_count.to_string().dimmed(),
                if skip_count == 1 { "skip" } else { "skips" }
            )?;
        } else {
            writeln!(
                writer,
                "{}{} ({}): {} updates, {} skips",
                prefix, path_display, project.dialect, update_count, skip_count
            )?;
        }

        let width = Self::max_name_length(project.decisions.iter());
        for decision in project.updates() {
            self.format_update_line(decision, width, writer)?;
        }

        if verbose && skip_count > 0 {
            if self.color {
                writeln!(writer, "  {}", "Skipped:".dimmed())?;
            } else {
                writeln!(writer, "  Skipped:")?;
            }
            for decision in project.skips() {
                self.format_skip_line(decision, width, writer)?;
            }
        }

        self.format_problems(project, writer)?;
        writeln!(writer)
    }
}
