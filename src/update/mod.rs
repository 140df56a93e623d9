//! Update judgment logic for dependencies
//!
//! This module provides:
//! - Update filter configuration from CLI args
//! - Pure version policy evaluation and best-candidate selection
//! - Update judgment engine that decides whether to update or skip

mod filter;
mod policy;

pub use filter::UpdateFilter;
pub use policy::{is_valid_update, parse_candidates, select_best};

use crate::domain::{Dependency, SemanticVersion, SkipReason, UpdateDecision, UpdatePolicy};
use tracing::warn;

/// Update judgment engine that decides whether to update a dependency
#[derive(Debug, Clone)]
pub struct UpdateJudge {
    /// Policy fixed for the whole run
    policy: UpdatePolicy,
    /// Filter configuration
    filter: UpdateFilter,
    /// Whether prerelease candidates may be selected
    include_prerelease: bool,
}

impl UpdateJudge {
    /// Create a new UpdateJudge; prerelease candidates are rejected
    pub fn new(policy: UpdatePolicy, filter: UpdateFilter) -> Self {
        Self {
            policy,
            filter,
            include_prerelease: false,
        }
    }

    /// Allow prerelease candidates
    pub fn with_include_prerelease(mut self, include: bool) -> Self {
        self.include_prerelease = include;
        self
    }

    /// Returns the policy this judge applies
    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Check if a dependency needs a registry lookup at all
    /// Returns Some(SkipReason) if it should be skipped, None if it should be processed
    pub fn should_skip(&self, dependency: &Dependency) -> Option<SkipReason> {
        if !self.filter.should_process_package(&dependency.package_id) {
            return if !self.filter.only.is_empty() {
                Some(SkipReason::NotInOnlyList)
            } else {
                Some(SkipReason::Excluded)
            };
        }
        SemanticVersion::parse(&dependency.version)
            .err()
            .map(|e| SkipReason::InvalidVersion(e.to_string()))
    }

    /// Judge whether to update a dependency given the versions on the feed
    pub fn judge(&self, dependency: &Dependency, available_versions: &[String]) -> UpdateDecision {
        if let Some(reason) = self.should_skip(dependency) {
            return UpdateDecision::skip(dependency.clone(), reason);
        }

        let Ok(current) = SemanticVersion::parse(&dependency.version) else {
            return UpdateDecision::skip(
                dependency.clone(),
                SkipReason::InvalidVersion(dependency.version.clone()),
            );
        };

        if available_versions.is_empty() {
            return UpdateDecision::skip(dependency.clone(), SkipReason::NoVersionsFound);
        }

        let candidates = parse_candidates(&dependency.package_id, available_versions);
        if candidates.is_empty() {
            warn!(
                package = %dependency.package_id,
                listed = available_versions.len(),
                "none of the listed versions could be parsed"
            );
            return UpdateDecision::skip(dependency.clone(), SkipReason::NoVersionsFound);
        }
        match select_best(
            &candidates,
            self.policy,
            &current,
            self.include_prerelease,
        ) {
            Some(selected) => UpdateDecision::update(dependency.clone(), selected),
            None => UpdateDecision::skip_already_latest(dependency.clone()),
        }
    }
}
