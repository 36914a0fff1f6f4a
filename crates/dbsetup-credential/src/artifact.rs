//! The identity provider's token artifact.
//!
//! A JSON object, or an array of objects, each with `accessToken` and
//! `expiresOn`. Timestamps are local time, `%Y-%m-%d %H:%M:%S%.f`.

use crate::error::{CredentialError, REMEDIATION};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Tokens expiring within this many minutes are treated as expired.
pub const FRESHNESS_WINDOW_MINUTES: i64 = 5;

const EXPIRES_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Deserialize)]
struct RawToken {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "expiresOn")]
    expires_on: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawArtifact {
    One(RawToken),
    Many(Vec<RawToken>),
}

/// A bearer token and its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Local>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

impl AccessToken {
    /// Read the artifact file. A missing file is [`CredentialError::Missing`].
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::Missing {
                    path: path.to_path_buf(),
                    remediation: REMEDIATION,
                });
            }
            Err(source) => {
                return Err(CredentialError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(&raw).map_err(|detail| CredentialError::Parse {
            path: path.to_path_buf(),
            detail,
        })
    }

    /// Parse artifact contents. For arrays the entry expiring last wins.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let artifact: RawArtifact = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        let entries = match artifact {
            RawArtifact::One(token) => vec![token],
            RawArtifact::Many(tokens) => tokens,
        };

        let mut latest: Option<AccessToken> = None;
        for entry in entries {
            let parsed = AccessToken {
                expires_on: parse_expiry(&entry.expires_on)?,
                token: entry.access_token,
            };
            if latest.as_ref().is_none_or(|l| parsed.expires_on > l.expires_on) {
                latest = Some(parsed);
            }
        }
        latest.ok_or_else(|| "artifact holds no tokens".to_string())
    }

    /// True if the token is still valid for more than [`FRESHNESS_WINDOW_MINUTES`].
    pub fn is_fresh_at(&self, now: DateTime<Local>) -> bool {
        self.expires_on - now > Duration::minutes(FRESHNESS_WINDOW_MINUTES)
    }
}

fn parse_expiry(raw: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), EXPIRES_ON_FORMAT)
        .map_err(|e| format!("invalid expiresOn '{}': {}", raw, e))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("expiresOn '{}' does not exist in local time", raw))
}
