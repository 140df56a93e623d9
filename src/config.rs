//! Feed settings
//!
//! The feed URL is resolved from (in priority order):
//! - `--source` on the command line (clap also fills it from `NUGET_FEED_URL`)
//! - `appsettings.json` in the working directory (`NuGetSettings.FeedUrl`)
//! - nuget.org

use crate::error::ConfigError;
use crate::registry::DEFAULT_FEED_URL;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE: &str = "appsettings.json";

/// Where the feed URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    /// `--source` or `NUGET_FEED_URL`
    CommandLine,
    /// `appsettings.json`
    SettingsFile,
    /// Built-in default
    Default,
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::CommandLine => write!(f, "command line"),
            SettingsSource::SettingsFile => write!(f, "{}", SETTINGS_FILE),
            SettingsSource::Default => write!(f, "default"),
        }
    }
}

/// Resolved run settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// NuGet v3 service index URL
    pub feed_url: String,
    /// Origin of `feed_url`
    pub source: SettingsSource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AppSettings {
    #[serde(default)]
    nu_get_settings: Option<NuGetSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NuGetSettings {
    #[serde(default)]
    feed_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            source: SettingsSource::Default,
        }
    }
}

impl Settings {
    /// Resolve settings from the command line value and the settings file in `dir`
    pub fn resolve(cli_source: Option<&str>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(url) = cli_source.map(str::trim).filter(|u| !u.is_empty()) {
            return Ok(Self {
                feed_url: url.to_string(),
                source: SettingsSource::CommandLine,
            });
        }

        if let Some(url) = read_settings_file(dir)? {
            return Ok(Self {
                feed_url: url,
                source: SettingsSource::SettingsFile,
            });
        }

        Ok(Self::default())
    }
}

/// Reads `NuGetSettings.FeedUrl` from `appsettings.json`, if the file exists
fn read_settings_file(dir: &Path) -> Result<Option<String>, ConfigError> {
    let path = dir.join(SETTINGS_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::InvalidSettings {
        path: path.clone(),
        message: e.to_string(),
    })?;
    let settings: AppSettings = serde_json::from_str(content.trim_start_matches('\u{feff}'))
        .map_err(|e| ConfigError::InvalidSettings {
            path: path.clone(),
            message: e.to_string(),
        })?;

    Ok(settings
        .nu_get_settings
        .and_then(|s| s.feed_url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty()))
}
