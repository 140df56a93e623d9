//! Update filter configuration
//!
//! This module provides the UpdateFilter struct that encapsulates
//! the package filter options for update judgment.

/// Filter configuration for update judgment
#[derive(Debug, Clone, Default)]
pub struct UpdateFilter {
    /// Packages to exclude from updates
    pub exclude: Vec<String>,
    /// If non-empty, only update these packages
    pub only: Vec<String>,
}

impl UpdateFilter {
    /// Create a new UpdateFilter with default settings (process all)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set packages to exclude
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set packages to include (only list)
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    /// Check if a package should be processed based on filters
    ///
    /// NuGet package ids are case-insensitive on the feed, so filter entries
    /// match regardless of case.
    pub fn should_process_package(&self, package_id: &str) -> bool {
        if !self.only.is_empty() {
            return self.only.iter().any(|p| p.eq_ignore_ascii_case(package_id));
        }
        !self.exclude.iter().any(|p| p.eq_ignore_ascii_case(package_id))
    }
}
