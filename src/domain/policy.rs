//! Update policy selected for a run

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far a dependency may move from its current version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Only versions with a higher major component
    Major,
    /// Same major, higher minor
    Minor,
    /// Same major and minor, higher patch
    Patch,
}

impl UpdatePolicy {
    /// Returns the command-line flag selecting this policy
    pub fn flag(&self) -> &'static str {
        match self {
            UpdatePolicy::Major => "--major",
            UpdatePolicy::Minor => "--minor",
            UpdatePolicy::Patch => "--patch",
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpdatePolicy::Major => "major",
            UpdatePolicy::Minor => "minor",
            UpdatePolicy::Patch => "patch",
        };
        write!(f, "{}", label)
    }
}
