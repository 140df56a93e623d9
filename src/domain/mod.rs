//! Core domain models for nupdate
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency information read from a manifest
//! - Manifest dialects (PackageReference vs packages.config)
//! - Semantic versions with NuGet precedence rules
//! - Update policy (major/minor/patch)
//! - Update decisions and per-project summaries

mod dependency;
mod dialect;
mod policy;
mod summary;
mod update_result;
mod version;

pub use dependency::Dependency;
pub use dialect::Dialect;
pub(crate) use dialect::PACKAGES_CONFIG;
pub use policy::UpdatePolicy;
pub use summary::{ProjectFailure, ProjectUpdateResult, UpdateSummary};
pub use update_result::{SkipReason, UpdateDecision};
pub use version::SemanticVersion;
