//! Configuration errors.

use std::path::PathBuf;

/// Why a configuration could not be loaded, validated or saved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is neither valid JSON5 nor valid JSON, or has fields of the
    /// wrong type.
    #[error("malformed config: {0}")]
    ParseJson5(#[from] serde_json5::Error),

    #[error("cannot serialize config: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// `url` is not an `http://` or `https://` URL with a host.
    #[error("invalid Sentry URL {0:?}, expected http(s)://host")]
    InvalidUrl(String),

    #[error("invalid pagination settings: {reason}")]
    InvalidPagination { reason: String },

    /// The platform reports no configuration directory for this user.
    #[error("no user configuration directory")]
    NoHomeDirectory,
}

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
