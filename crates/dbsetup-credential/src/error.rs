//! Error types for the credential crate.

use dbsetup_core::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// How the operator mints a fresh token artifact.
pub const REMEDIATION: &str = "run `az login`, then \
`az account get-access-token --resource 2ff814a6-3304-4ab8-85cb-cd0e6f879c1d`";

/// Errors on the elevated-credential path.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No token artifact at the expected location.
    #[error("no access token found at {}; {remediation}", .path.display())]
    Missing {
        path: PathBuf,
        remediation: &'static str,
    },

    /// The token expires within the freshness window.
    #[error("access token expired or expires soon ({expires_on}); {remediation}")]
    Expired {
        expires_on: String,
        remediation: &'static str,
    },

    /// The refreshed profile does not resolve to a usable configuration.
    #[error("elevated profile {profile} is not usable: {source}; {remediation}")]
    Invalid {
        profile: String,
        remediation: &'static str,
        #[source]
        source: ConfigError,
    },

    /// The artifact exists but is not a token document.
    #[error("cannot parse token artifact {}: {detail}", .path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The profile file could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
