//! Error types for configuration declaration and resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or resolving configuration.
///
/// All of them are terminal for the resolution call that produced them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot override nonexistent config setting(s): {}", .0.join(", "))]
    UnknownOption(Vec<String>),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("environment {environment} not found in {}", path.display())]
    EnvironmentNotFound { environment: String, path: PathBuf },

    #[error("key missing: {key} (in {})", path.display())]
    MissingKey { key: String, path: PathBuf },

    #[error(
        "config is not environment-based or was not loaded from a file, \
         cannot select an alternate configuration"
    )]
    NotEnvironmentBased,

    #[error("invalid override for {option}: {reason}")]
    InvalidOverride { option: String, reason: String },

    #[error("invalid document {}: {reason}", path.display())]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid option manifest: {0}")]
    InvalidManifest(String),

    #[error("cannot deserialize option {option}: {source}")]
    Deserialize {
        option: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("logging setup failed: {0}")]
    Logging(String),
}
