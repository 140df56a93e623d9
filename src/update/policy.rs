//! Version policy evaluation
//!
//! Pure functions deciding whether a candidate version is an allowed update
//! for a current version, and picking the best candidate.

use crate::domain::{SemanticVersion, UpdatePolicy};
use std::cmp::Ordering;
use tracing::debug;

/// Returns true if `candidate` is an allowed update of `current` under `policy`
///
/// Every accepted candidate is strictly greater than `current`.
pub fn is_valid_update(
    candidate: &SemanticVersion,
    policy: UpdatePolicy,
    current: &SemanticVersion,
    include_prerelease: bool,
) -> bool {
    if candidate.is_prerelease() && !include_prerelease {
        return false;
    }

    let qualifies = match policy {
        UpdatePolicy::Major => candidate.major > current.major,
        UpdatePolicy::Minor => {
            candidate.major == current.major && candidate.minor > current.minor
        }
        UpdatePolicy::Patch => {
            candidate.major == current.major
                && candidate.minor == current.minor
                && candidate.patch > current.patch
        }
    };

    qualifies && candidate > current
}

/// Picks the greatest qualifying candidate
///
/// Versions that compare equal (differing only in build metadata or
/// spelling) are ordered by their original string, so the result does not
/// depend on input order.
pub fn select_best<'a, I>(
    candidates: I,
    policy: UpdatePolicy,
    current: &SemanticVersion,
    include_prerelease: bool,
) -> Option<SemanticVersion>
where
    I: IntoIterator<Item = &'a SemanticVersion>,
{
    candidates
        .into_iter()
        .filter(|c| is_valid_update(c, policy, current, include_prerelease))
        .max_by(|a, b| compare_for_selection(a, b))
        .cloned()
}

fn compare_for_selection(a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
    a.cmp(b).then_with(|| a.as_str().cmp(b.as_str()))
}

/// Parses registry version strings, dropping the ones that are not versions
pub fn parse_candidates(package_id: &str, raw: &[String]) -> Vec<SemanticVersion> {
    raw.iter()
        .filter_map(|text| match SemanticVersion::parse(text) {
            Ok(version) => Some(version),
            Err(e) => {
                debug!(package = package_id, version = %text, error = %e, "ignoring unparsable candidate");
                None
            }
        })
        .collect()
}
