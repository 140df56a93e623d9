//! Update decision result types

use super::{Dependency, SemanticVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why no version was selected for a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No available version qualifies under the policy
    AlreadyLatest,
    /// The registry returned no usable versions
    NoVersionsFound,
    /// Failed to fetch version info from registry
    FetchFailed(String),
    /// The current version could not be parsed
    InvalidVersion(String),
    /// Package was excluded via --exclude flag
    Excluded,
    /// Package not in --only list
    NotInOnlyList,
    /// An earlier entry with the same id is the one that gets written
    DuplicateEntry,
}

impl SkipReason {
    /// Returns true when the skip means "could not determine" rather than "nothing to do"
    pub fn is_failure(&self) -> bool {
        matches!(self, SkipReason::FetchFailed(_) | SkipReason::InvalidVersion(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyLatest => write!(f, "already up to date"),
            SkipReason::NoVersionsFound => write!(f, "no versions found"),
            SkipReason::FetchFailed(msg) => write!(f, "fetch failed: {}", msg),
            SkipReason::InvalidVersion(msg) => write!(f, "invalid version: {}", msg),
            SkipReason::Excluded => write!(f, "excluded by --exclude"),
            SkipReason::NotInOnlyList => write!(f, "not in --only list"),
            SkipReason::DuplicateEntry => write!(f, "duplicate entry, only the first is updated"),
        }
    }
}

/// Decision taken for a single dependency
///
/// `Update` always carries a version that satisfies the active policy and is
/// strictly greater than the current one. `Skip` never touches the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateDecision {
    /// Dependency will be updated
    Update {
        /// The dependency being updated
        dependency: Dependency,
        /// The selected version
        new_version: SemanticVersion,
    },
    /// No version was selected
    Skip {
        /// The dependency that was skipped
        dependency: Dependency,
        /// The reason for skipping
        reason: SkipReason,
    },
}

impl UpdateDecision {
    /// Creates an Update decision
    pub fn update(dependency: Dependency, new_version: SemanticVersion) -> Self {
        UpdateDecision::Update {
            dependency,
            new_version,
        }
    }

    /// Creates a Skip decision
    pub fn skip(dependency: Dependency, reason: SkipReason) -> Self {
        UpdateDecision::Skip { dependency, reason }
    }

    /// Creates a Skip decision for an up-to-date dependency
    pub fn skip_already_latest(dependency: Dependency) -> Self {
        Self::skip(dependency, SkipReason::AlreadyLatest)
    }

    /// Creates a Skip decision for a fetch failure
    pub fn skip_fetch_failed(dependency: Dependency, message: impl Into<String>) -> Self {
        Self::skip(dependency, SkipReason::FetchFailed(message.into()))
    }

    /// Returns true if this is an update decision
    pub fn is_update(&self) -> bool {
        matches!(self, UpdateDecision::Update { .. })
    }

    /// Returns true if this is a skip decision
    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateDecision::Skip { .. })
    }

    /// Returns the dependency reference
    pub fn dependency(&self) -> &Dependency {
        match self {
            UpdateDecision::Update { dependency, .. } => dependency,
            UpdateDecision::Skip { dependency, .. } => dependency,
        }
    }

    /// Returns the selected version, if any
    pub fn selected_version(&self) -> Option<&SemanticVersion> {
        match self {
            UpdateDecision::Update { new_version, .. } => Some(new_version),
            UpdateDecision::Skip { .. } => None,
        }
    }

    /// Returns the skip reason, if any
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            UpdateDecision::Update { .. } => None,
            UpdateDecision::Skip { reason, .. } => Some(reason),
        }
    }

    /// Returns the package identifier
    pub fn package_id(&self) -> &str {
        &self.dependency().package_id
    }
}

impl fmt::Display for UpdateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateDecision::Update {
                dependency,
                new_version,
            } => write!(
                f,
                "{}: {} → {}",
                dependency.package_id, dependency.version, new_version
            ),
            UpdateDecision::Skip { dependency, reason } => {
                write!(f, "{}: skipped ({})", dependency.package_id, reason)
            }
        }
    }
}
