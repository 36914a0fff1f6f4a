//! Minting the elevated profile.
//!
//! Before a key-vault scope is created the fresh identity-provider token is
//! copied into the profile file under the elevated profile name, next to the
//! base profile's host. Callers then run the create under that profile.

use crate::artifact::AccessToken;
use crate::error::{CredentialError, REMEDIATION};
use chrono::{DateTime, Local};
use dbsetup_core::ProfileStore;
use std::path::PathBuf;

/// Name of a profile holding a freshly rotated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatedProfile {
    pub name: String,
}

/// Capability to produce an elevated profile on demand.
pub trait ElevatedCredentials: Send + Sync {
    fn ensure_elevated(&self) -> Result<ElevatedProfile, CredentialError>;
}

/// Rotates the token artifact into the profile file.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    artifact_path: PathBuf,
    profile_file: PathBuf,
    base_profile: String,
    elevated_profile: String,
}

impl TokenRefresher {
    pub fn new(
        artifact_path: impl Into<PathBuf>,
        profile_file: impl Into<PathBuf>,
        base_profile: impl Into<String>,
        elevated_profile: impl Into<String>,
    ) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            profile_file: profile_file.into(),
            base_profile: base_profile.into(),
            elevated_profile: elevated_profile.into(),
        }
    }

    /// Rotate the token as of `now`.
    pub fn ensure_elevated_at(&self, now: DateTime<Local>) -> Result<ElevatedProfile, CredentialError> {
        let token = AccessToken::load(&self.artifact_path)?;
        if !token.is_fresh_at(now) {
            return Err(CredentialError::Expired {
                expires_on: token.expires_on.format("%Y-%m-%d %H:%M:%S").to_string(),
                remediation: REMEDIATION,
            });
        }

        let mut store = ProfileStore::load(&self.profile_file)?;
        let base = store.resolve(&self.base_profile)?;
        store.upsert(&self.elevated_profile, &base.host, &token.token);
        // Nothing is written unless the updated profile resolves.
        self.check(&store)?;
        store.save()?;
        self.check(&ProfileStore::load(store.path())?)?;

        tracing::info!(
            profile = %self.elevated_profile,
            path = %store.path().display(),
            expires_on = %token.expires_on,
            "Rotated elevated profile token"
        );

        Ok(ElevatedProfile {
            name: self.elevated_profile.clone(),
        })
    }

    fn check(&self, store: &ProfileStore) -> Result<(), CredentialError> {
        store
            .resolve(&self.elevated_profile)
            .map(|_| ())
            .map_err(|source| CredentialError::Invalid {
                profile: self.elevated_profile.clone(),
                remediation: REMEDIATION,
                source,
            })
    }
}

impl ElevatedCredentials for TokenRefresher {
    fn ensure_elevated(&self) -> Result<ElevatedProfile, CredentialError> {
        self.ensure_elevated_at(Local::now())
    }
}
