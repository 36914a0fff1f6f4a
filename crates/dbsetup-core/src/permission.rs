//! Permission levels and grants.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A permission level, drawn from the enumeration of the resource kind it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    // Cluster levels
    CanManage,
    CanRestart,
    CanAttachTo,
    // Scope levels
    Read,
    Write,
    Manage,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::CanManage => "CAN_MANAGE",
            PermissionLevel::CanRestart => "CAN_RESTART",
            PermissionLevel::CanAttachTo => "CAN_ATTACH_TO",
            PermissionLevel::Read => "READ",
            PermissionLevel::Write => "WRITE",
            PermissionLevel::Manage => "MANAGE",
        }
    }
}

impl FromStr for PermissionLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CAN_MANAGE" => Ok(PermissionLevel::CanManage),
            "CAN_RESTART" => Ok(PermissionLevel::CanRestart),
            "CAN_ATTACH_TO" => Ok(PermissionLevel::CanAttachTo),
            "READ" => Ok(PermissionLevel::Read),
            "WRITE" => Ok(PermissionLevel::Write),
            "MANAGE" => Ok(PermissionLevel::Manage),
            _ => Err(CoreError::UnknownPermission(s.to_string())),
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permission level held by a principal on some resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub principal: String,
    pub level: PermissionLevel,
}

impl Grant {
    pub fn new(principal: impl Into<String>, level: PermissionLevel) -> Self {
        Self {
            principal: principal.into(),
            level,
        }
    }
}

/// Every non-inherited permission level one principal holds on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalPermissions {
    pub principal: String,
    /// Sorted alphabetically.
    pub levels: Vec<PermissionLevel>,
}

impl PrincipalPermissions {
    pub fn new(principal: impl Into<String>, mut levels: Vec<PermissionLevel>) -> Self {
        levels.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        levels.dedup();
        Self {
            principal: principal.into(),
            levels,
        }
    }

    /// Whether the principal holds exactly `level` and nothing else.
    pub fn holds_only(&self, level: PermissionLevel) -> bool {
        self.levels.as_slice() == [level]
    }
}
