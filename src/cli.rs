//! CLI argument parsing module for nupdate

use crate::domain::UpdatePolicy;
use crate::orchestrator::DEFAULT_CONCURRENCY;
use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Parse a positive number of seconds
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s))?;
    if secs == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// NuGet dependency updater
#[derive(Parser, Debug, Clone)]
#[command(name = "nupdate", version, about = "NuGet dependency updater")]
#[command(group(
    ArgGroup::new("policy")
        .required(true)
        .multiple(false)
        .args(["major", "minor", "patch"])
))]
pub struct CliArgs {
    /// Solution, project file, packages.config or directory to update
    #[arg(long)]
    pub path: PathBuf,

    // Update policy
    /// Update to the latest higher major version
    #[arg(long)]
    pub major: bool,

    /// Update to the latest higher minor version within the same major
    #[arg(long)]
    pub minor: bool,

    /// Update to the latest higher patch within the same major.minor
    #[arg(long)]
    pub patch: bool,

    // Feed options
    /// NuGet v3 service index URL
    #[arg(long, env = "NUGET_FEED_URL")]
    pub source: Option<String>,

    /// Cancel the run after this many seconds
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Maximum concurrent registry requests
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    // General options
    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    // Package filters
    /// Exclude specific packages from update (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Update only specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub only: Vec<String>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Restore packages for every changed project
    #[arg(long)]
    pub restore: bool,
}

impl CliArgs {
    /// Returns the selected update policy
    pub fn policy(&self) -> UpdatePolicy {
        if self.major {
            UpdatePolicy::Major
        } else if self.minor {
            UpdatePolicy::Minor
        } else {
            UpdatePolicy::Patch
        }
    }
}
