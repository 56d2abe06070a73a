use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes for machine-readable output.
pub mod codes {
    pub const CONFIG_MISSING_ROOT: &str = "CONFIG_MISSING_ROOT";
    pub const CONFIG_NO_PACKAGES: &str = "CONFIG_NO_PACKAGES";
    pub const CONFIG_INVALID_GLOB: &str = "CONFIG_INVALID_GLOB";
    pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";
    pub const CONFIG_PARSE_FAILED: &str = "CONFIG_PARSE_FAILED";
    pub const CONFIG_INVALID_MODE: &str = "CONFIG_INVALID_MODE";
    pub const CONFIG_NOT_FOUND: &str = "CONFIG_NOT_FOUND";
    pub const RESOLVE_FS_ERROR: &str = "RESOLVE_FS_ERROR";
}

/// Configuration errors, raised while building the registry or loading config.
///
/// These are fatal to construction: no resolver should be built after one.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No root for package {entry}")]
    MissingRoot { entry: String },

    #[error("No packages configured")]
    NoPackages,

    #[error("Invalid package glob {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid mode {value:?}: expected \"development\" or \"production\"")]
    InvalidMode { value: String },

    #[error("Could not find packages configuration from {start}")]
    NotFound { start: PathBuf },
}

impl ConfigError {
    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingRoot { .. } => codes::CONFIG_MISSING_ROOT,
            Self::NoPackages => codes::CONFIG_NO_PACKAGES,
            Self::InvalidGlob { .. } => codes::CONFIG_INVALID_GLOB,
            Self::Read { .. } => codes::CONFIG_READ_FAILED,
            Self::Parse { .. } => codes::CONFIG_PARSE_FAILED,
            Self::InvalidMode { .. } => codes::CONFIG_INVALID_MODE,
            Self::NotFound { .. } => codes::CONFIG_NOT_FOUND,
        }
    }
}

/// Errors raised by `Resolver::resolve`.
///
/// Unknown or malformed specifiers are never errors; they pass through unchanged.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Filesystem { .. } => codes::RESOLVE_FS_ERROR,
        }
    }
}

/// Core error type for uniresolve operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl Error {
    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.code(),
            Self::Resolve(e) => e.code(),
        }
    }
}
