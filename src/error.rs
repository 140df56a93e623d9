//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with project, packages.config and solution files
//! - RegistryError: Issues with NuGet feed communication
//! - VersionError: Unparsable version strings
//! - ConfigError: Issues with CLI and settings configuration

use std::path::PathBuf;
use thiserror::Error;

/// Setup error returned before any project is processed
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML document (project file or packages.config)
    #[error("failed to parse XML in {path}: {message}")]
    XmlParseError { path: PathBuf, message: String },

    /// Path is neither a solution, a project file nor a packages.config
    #[error("unsupported manifest format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Errors related to NuGet feed communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },

    /// The feed's service index does not advertise a usable resource
    #[error("service index {url} has no {resource} resource")]
    MissingResource { url: String, resource: String },

    /// The lookup was cancelled by the caller
    #[error("lookup of '{package}' was cancelled")]
    Cancelled { package: String },
}

/// Errors raised while parsing a version string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Version string is empty
    #[error("empty version string")]
    Empty,

    /// Version string is not a valid NuGet/semantic version
    #[error("invalid version '{version}': {message}")]
    Invalid { version: String, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },

    /// Settings file exists but cannot be read or parsed
    #[error("invalid settings file {path}: {message}")]
    InvalidSettings { path: PathBuf, message: String },

    /// Log file could not be opened
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new XmlParseError
    pub fn xml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::XmlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnsupportedFormat error
    pub fn unsupported(path: impl Into<PathBuf>) -> Self {
        ManifestError::UnsupportedFormat { path: path.into() }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new Cancelled error
    pub fn cancelled(package: impl Into<String>) -> Self {
        RegistryError::Cancelled {
            package: package.into(),
        }
    }

    /// Returns true if this error was caused by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RegistryError::Cancelled { .. })
    }
}

impl VersionError {
    /// Creates a new Invalid error
    pub fn invalid(version: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::Invalid {
            version: version.into(),
            message: message.into(),
        }
    }
}
