//! The control-plane CLI profile file.
//!
//! An INI file with one section per profile:
//!
//! ```text
//! [DEFAULT]
//! host = https://adb-123.4.azuredatabricks.net
//! token = dapi...
//! ```
//!
//! Updates rewrite only the keys they touch; other sections, comments and
//! unknown keys are kept as they were.

use crate::error::ConfigError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the profile used when none is given.
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Host and bearer token for one profile.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub name: String,
    pub host: String,
    pub token: String,
}

impl ProfileConfig {
    /// Base URL of the REST API for a version, e.g. `https://host/api/2.0`.
    pub fn api_base(&self, api_version: &str) -> String {
        format!("{}/api/{}", self.host.trim_end_matches('/'), api_version)
    }
}

impl fmt::Debug for ProfileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileConfig")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
struct Section {
    name: String,
    lines: Vec<String>,
}

impl Section {
    fn get(&self, key: &str) -> Option<String> {
        self.lines.iter().find_map(|line| {
            let (k, v) = split_entry(line)?;
            (k == key).then(|| v.to_string())
        })
    }

    fn set(&mut self, key: &str, value: &str) {
        let rendered = format!("{} = {}", key, value);
        for line in self.lines.iter_mut() {
            if split_entry(line).is_some_and(|(k, _)| k == key) {
                *line = rendered;
                return;
            }
        }
        // Keep trailing blank lines after the new entry.
        let insert_at = self
            .lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        self.lines.insert(insert_at, rendered);
    }
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') || trimmed.starts_with(';') {
        return None;
    }
    let (k, v) = trimmed.split_once('=')?;
    Some((k.trim(), v.trim()))
}

/// In-memory view of a profile file.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    preamble: Vec<String>,
    sections: Vec<Section>,
}

impl ProfileStore {
    /// Load a profile file. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(Self::parse(path, &raw))
    }

    fn parse(path: &Path, raw: &str) -> Self {
        let mut preamble = Vec::new();
        let mut sections: Vec<Section> = Vec::new();

        for line in raw.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                sections.push(Section {
                    name: name.trim().to_string(),
                    lines: Vec::new(),
                });
                continue;
            }
            match sections.last_mut() {
                Some(section) => section.lines.push(line.to_string()),
                None => preamble.push(line.to_string()),
            }
        }

        Self {
            path: path.to_path_buf(),
            preamble,
            sections,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, profile: &str) -> bool {
        self.sections.iter().any(|s| s.name == profile)
    }

    /// Resolve a profile to host and token.
    pub fn resolve(&self, profile: &str) -> Result<ProfileConfig, ConfigError> {
        let section = self
            .sections
            .iter()
            .find(|s| s.name == profile)
            .ok_or_else(|| ConfigError::ProfileNotConfigured {
                profile: profile.to_string(),
                path: self.path.clone(),
            })?;

        let require = |key: &'static str| {
            section
                .get(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::ProfileIncomplete {
                    profile: profile.to_string(),
                    key,
                    path: self.path.clone(),
                })
        };

        Ok(ProfileConfig {
            name: profile.to_string(),
            host: require("host")?,
            token: require("token")?,
        })
    }

    /// Set host and token on a profile, creating the section if needed.
    pub fn upsert(&mut self, profile: &str, host: &str, token: &str) {
        let index = match self.sections.iter().position(|s| s.name == profile) {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    name: profile.to_string(),
                    lines: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        let section = &mut self.sections[index];
        section.set("host", host);
        section.set("token", token);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.preamble {
            out.push_str(line);
            out.push('\n');
        }
        for section in &self.sections {
            out.push_str(&format!("[{}]\n", section.name));
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    /// Write the store back to its file.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, self.render()).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
