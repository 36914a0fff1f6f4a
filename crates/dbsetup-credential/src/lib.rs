//! # dbsetup-credential
//!
//! Elevated-credential handling for dbsetup.
//!
//! Creating a key-vault backed secret scope needs a token minted by the
//! identity provider rather than the workspace's personal access token. This
//! crate reads that token from the provider CLI's artifact, rejects it when
//! it is about to expire, and writes it into the profile file under the
//! elevated profile name.

pub mod artifact;
pub mod elevate;
pub mod error;

pub use artifact::{AccessToken, FRESHNESS_WINDOW_MINUTES};
pub use elevate::{ElevatedCredentials, ElevatedProfile, TokenRefresher};
pub use error::{CredentialError, REMEDIATION};
