//! Error types for the core crate.

use crate::resource::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building core values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A resource name was empty after trimming.
    #[error("{kind} name must not be empty")]
    EmptyName { kind: ResourceKind },

    /// A permission level outside the known enumeration.
    #[error("unknown permission level: {0}")]
    UnknownPermission(String),
}

/// Errors raised while loading configuration or resolving profiles.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The named profile has no section in the profile file.
    #[error(
        "The profile {profile} has not been configured, please add it to the databricks cli ({})",
        .path.display()
    )]
    ProfileNotConfigured { profile: String, path: PathBuf },

    /// The profile section lacks a required key.
    #[error("profile {profile} is missing '{key}' in {}", .path.display())]
    ProfileIncomplete {
        profile: String,
        key: &'static str,
        path: PathBuf,
    },

    /// The home directory could not be determined for `~` expansion.
    #[error("cannot resolve home directory for {0}")]
    NoHomeDirectory(String),

    /// YAML parse error.
    #[error("invalid configuration file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO error.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
