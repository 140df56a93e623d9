//! Logging setup for the command-line binary
//!
//! Diagnostics go to stderr so that stdout carries only the report. The
//! stderr level follows `--verbose`/`--quiet` unless `RUST_LOG` is set. With
//! `--log <FILE>` a second, uncoloured layer appends to the file at info
//! level or more.

use crate::error::ConfigError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Logging options derived from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level for the stderr layer
    pub level: LevelFilter,
    /// Optional log file
    pub log_file: Option<PathBuf>,
}

impl LogConfig {
    /// Builds the configuration from the output flags
    pub fn from_flags(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Self {
        let level = if quiet {
            LevelFilter::ERROR
        } else if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        };
        Self {
            level,
            log_file: log_file.map(Path::to_path_buf),
        }
    }

    /// Level used for the file layer
    pub fn file_level(&self) -> LevelFilter {
        std::cmp::max(self.level, LevelFilter::INFO)
    }
}

/// Installs the global subscriber
///
/// Installing twice is not an error; the first subscriber stays active.
pub fn init_logging(config: &LogConfig) -> Result<(), ConfigError> {
    let stderr_filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(stderr_filter);

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ConfigError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(config.file_level()),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    Ok(())
}
