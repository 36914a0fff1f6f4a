//! Configuration for dbsetup.
//!
//! Configuration is read from an optional YAML file (`dbsetup.yaml`). Every
//! field has a default, so an absent file yields a working configuration that
//! talks to the `databricks` CLI with the profiles in `~/.databrickscfg`.
//!
//! # Files
//!
//! - **dbsetup.yaml**: tool settings and the cluster template
//! - **~/.databrickscfg**: the control-plane CLI profile file (see [`profile`])

pub mod cluster;
pub mod profile;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use cluster::{ClusterTemplate, select_runtime_version};
pub use profile::{ProfileConfig, ProfileStore};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dbsetup.yaml";

/// Complete dbsetup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbSetupConfig {
    /// Control-plane CLI executable.
    #[serde(default = "default_cli_binary")]
    pub cli_binary: String,

    /// Profile file shared with the control-plane CLI.
    #[serde(default = "default_profile_file")]
    pub profile_file: String,

    /// REST API version segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Profile name the rotated elevated token is stored under.
    #[serde(default = "default_elevated_profile")]
    pub elevated_profile: String,

    /// Token artifact written by the identity provider's CLI.
    #[serde(default = "default_token_artifact")]
    pub token_artifact: String,

    /// Template for newly created clusters.
    #[serde(default)]
    pub cluster: ClusterTemplate,
}

impl Default for DbSetupConfig {
    fn default() -> Self {
        Self {
            cli_binary: default_cli_binary(),
            profile_file: default_profile_file(),
            api_version: default_api_version(),
            elevated_profile: default_elevated_profile(),
            token_artifact: default_token_artifact(),
            cluster: ClusterTemplate::default(),
        }
    }
}

impl DbSetupConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicit file, or `dbsetup.yaml` from the working directory if
    /// present, or fall back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            tracing::debug!(path = %local.display(), "Loading configuration");
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn profile_file_path(&self) -> Result<PathBuf, ConfigError> {
        expand_home(&self.profile_file)
    }

    pub fn token_artifact_path(&self) -> Result<PathBuf, ConfigError> {
        expand_home(&self.token_artifact)
    }
}

/// Expand a leading `~` against the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf, ConfigError> {
    let rest = match path.strip_prefix('~') {
        Some(rest) => rest,
        None => return Ok(PathBuf::from(path)),
    };
    let base = directories::BaseDirs::new().ok_or_else(|| ConfigError::NoHomeDirectory(path.to_string()))?;
    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(base.home_dir().to_path_buf())
    } else {
        Ok(base.home_dir().join(rest))
    }
}

fn default_cli_binary() -> String {
    "databricks".to_string()
}

fn default_profile_file() -> String {
    "~/.databrickscfg".to_string()
}

fn default_api_version() -> String {
    "2.0".to_string()
}

fn default_elevated_profile() -> String {
    "AAD".to_string()
}

fn default_token_artifact() -> String {
    "~/.azure/accessTokens.json".to_string()
}
