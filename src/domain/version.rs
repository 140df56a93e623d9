//! Semantic versions with NuGet precedence
//!
//! NuGet accepts a superset of SemVer 2.0: one to four numeric components
//! (`1`, `1.2`, `1.2.3`, `1.2.3.4`), an optional prerelease label after `-`
//! and optional build metadata after `+`. Missing components default to 0,
//! so `1.0` and `1.0.0` compare equal.
//!
//! Leading zeros are accepted everywhere a number appears: in the numeric
//! components (`01.2.3`) and in numeric prerelease identifiers
//! (`1.0.0-beta.01`). Both compare by value, so `1.0.0-beta.01` equals
//! `1.0.0-beta.1`.

use crate::error::VersionError;
use semver::{BuildMetadata, Prerelease};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed package version
///
/// Equality and ordering ignore build metadata and the original spelling.
#[derive(Debug, Clone)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Legacy fourth component (`1.2.3.4`)
    pub revision: u64,
    pub pre: Prerelease,
    pub build: BuildMetadata,
    original: String,
}

impl SemanticVersion {
    /// Parses a version string
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let (rest, build) = match trimmed.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (trimmed, None),
        };
        let (numeric, pre) = match rest.split_once('-') {
            Some((numeric, pre)) => (numeric, Some(pre)),
            None => (rest, None),
        };

        let components: Vec<&str> = numeric.split('.').collect();
        if components.len() > 4 {
            return Err(VersionError::invalid(
                trimmed,
                "more than four numeric components",
            ));
        }

        let mut numbers = [0u64; 4];
        for (slot, component) in numbers.iter_mut().zip(&components) {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::invalid(
                    trimmed,
                    format!("component '{}' is not a number", component),
                ));
            }
            *slot = component
                .parse()
                .map_err(|e| VersionError::invalid(trimmed, format!("{}", e)))?;
        }

        let pre = match pre {
            Some("") => return Err(VersionError::invalid(trimmed, "empty prerelease label")),
            Some(label) => Prerelease::new(&strip_leading_zeros(label))
                .map_err(|e| VersionError::invalid(trimmed, e.to_string()))?,
            None => Prerelease::EMPTY,
        };
        let build = match build {
            Some("") => return Err(VersionError::invalid(trimmed, "empty build metadata")),
            Some(meta) => BuildMetadata::new(meta)
                .map_err(|e| VersionError::invalid(trimmed, e.to_string()))?,
            None => BuildMetadata::EMPTY,
        };

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            revision: numbers[3],
            pre,
            build,
            original: trimmed.to_string(),
        })
    }

    /// Returns true if this version carries a prerelease label
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Returns the version exactly as it was parsed
    pub fn as_str(&self) -> &str {
        &self.original
    }

    fn numeric(&self) -> (u64, u64, u64, u64) {
        (self.major, self.minor, self.patch, self.revision)
    }
}

/// Drops leading zeros from the numeric identifiers of a prerelease label
fn strip_leading_zeros(label: &str) -> String {
    label
        .split('.')
        .map(|ident| {
            if ident.len() > 1 && ident.bytes().all(|b| b.is_ascii_digit()) {
                match ident.trim_start_matches('0') {
                    "" => "0",
                    trimmed => trimmed,
                }
            } else {
                ident
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Prerelease's Ord ranks an empty label above any non-empty one
        self.numeric()
            .cmp(&other.numeric())
            .then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
