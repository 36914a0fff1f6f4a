//! Managed resource identity: kinds, validated names and lifecycle status.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of workspace objects dbsetup manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A compute cluster. Names compare case-insensitively.
    Cluster,
    /// A secret scope. Names compare exactly.
    Scope,
}

impl ResourceKind {
    /// Lowercase label, also used as the access-group prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Cluster => "cluster",
            ResourceKind::Scope => "scope",
        }
    }

    /// Category header used when rendering plans.
    pub fn header(self) -> &'static str {
        match self {
            ResourceKind::Cluster => "Clusters",
            ResourceKind::Scope => "Scopes",
        }
    }

    /// Whether two names refer to the same resource of this kind.
    pub fn names_match(self, a: &str, b: &str) -> bool {
        match self {
            ResourceKind::Cluster => a.eq_ignore_ascii_case(b),
            ResourceKind::Scope => a == b,
        }
    }

    /// Whether a newly created resource of this kind is terminated right after creation
    /// unless the caller asks for it to keep running.
    pub fn parks_after_create(self) -> bool {
        matches!(self, ResourceKind::Cluster)
    }

    /// Whether a forced update recreates an existing resource of this kind.
    pub fn recreates_on_force(self) -> bool {
        matches!(self, ResourceKind::Scope)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, canonical resource name.
///
/// Cluster names are lowercased; scope names are kept verbatim. The name is
/// never empty, which keeps access-group derivation total.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
    kind: ResourceKind,
    value: String,
}

impl ResourceName {
    pub fn new(kind: ResourceKind, raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyName { kind });
        }
        let value = match kind {
            ResourceKind::Cluster => trimmed.to_lowercase(),
            ResourceKind::Scope => trimmed.to_string(),
        };
        Ok(Self { kind, value })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether a remote resource name refers to this resource.
    pub fn matches(&self, remote_name: &str) -> bool {
        self.kind.names_match(&self.value, remote_name)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Lifecycle status of a managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Absent,
    Pending,
    Running,
    Terminated,
}

impl LifecycleStatus {
    /// Map a state column reported by the control plane.
    pub fn from_remote(state: &str) -> Self {
        match state.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "RESTARTING" | "RESIZING" => LifecycleStatus::Pending,
            "RUNNING" => LifecycleStatus::Running,
            _ => LifecycleStatus::Terminated,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleStatus::Absent => "ABSENT",
            LifecycleStatus::Pending => "PENDING",
            LifecycleStatus::Running => "RUNNING",
            LifecycleStatus::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource as it exists in the remote workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedResource {
    pub kind: ResourceKind,
    pub name: String,
    /// Backend-assigned identifier. Scopes are keyed by name.
    pub id: Option<String>,
    pub status: LifecycleStatus,
    /// Scope backend type (`AZURE_KEYVAULT`, `DATABRICKS`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Key-vault URL for key-vault backed scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ManagedResource {
    pub fn cluster(id: impl Into<String>, name: impl Into<String>, status: LifecycleStatus) -> Self {
        Self {
            kind: ResourceKind::Cluster,
            name: name.into(),
            id: Some(id.into()),
            status,
            backend: None,
            url: None,
        }
    }

    pub fn scope(name: impl Into<String>, backend: Option<String>, url: Option<String>) -> Self {
        let name = name.into();
        Self {
            kind: ResourceKind::Scope,
            id: Some(name.clone()),
            name,
            status: LifecycleStatus::Running,
            backend,
            url,
        }
    }

    pub fn reference(&self) -> Option<ResourceRef> {
        self.id.as_ref().map(|id| ResourceRef {
            kind: self.kind,
            id: id.clone(),
        })
    }
}

/// Reference to an existing remote resource, used for ACL calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
