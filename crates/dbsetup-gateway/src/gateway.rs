use crate::error::GatewayError;
use async_trait::async_trait;
use dbsetup_core::{Grant, ManagedResource, PermissionLevel, ResourceKind, ResourceRef, ResourceSpec};

/// One permission level held by a principal, as reported by the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclPermission {
    pub level: PermissionLevel,
    /// Granted through a parent object rather than on the resource itself.
    pub inherited: bool,
}

/// All permissions one principal holds on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub principal: String,
    pub permissions: Vec<AclPermission>,
}

impl AclEntry {
    /// Entry with directly granted (non-inherited) levels.
    pub fn direct(principal: impl Into<String>, levels: &[PermissionLevel]) -> Self {
        Self {
            principal: principal.into(),
            permissions: levels
                .iter()
                .map(|&level| AclPermission {
                    level,
                    inherited: false,
                })
                .collect(),
        }
    }

    pub fn direct_levels(&self) -> Vec<PermissionLevel> {
        self.permissions
            .iter()
            .filter(|p| !p.inherited)
            .map(|p| p.level)
            .collect()
    }
}

/// Every operation dbsetup issues against the workspace control plane.
///
/// Implementations are bound to one profile. Each call either succeeds or
/// returns an error; there is no partial success.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<String>, GatewayError>;

    async fn create_group(&self, name: &str) -> Result<(), GatewayError>;

    async fn delete_group(&self, name: &str) -> Result<(), GatewayError>;

    /// List every resource of a kind. An empty workspace yields an empty list.
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ManagedResource>, GatewayError>;

    /// Create a resource and return its backend identifier.
    ///
    /// `profile_override` runs the call under another profile (the elevated
    /// profile for key-vault scopes).
    async fn create_resource(
        &self,
        spec: &ResourceSpec,
        profile_override: Option<&str>,
    ) -> Result<String, GatewayError>;

    async fn update_resource(&self, resource: &ResourceRef, spec: &ResourceSpec) -> Result<(), GatewayError>;

    /// Stop a running resource without deleting it.
    async fn terminate_resource(&self, resource: &ResourceRef) -> Result<(), GatewayError>;

    async fn delete_resource(&self, resource: &ResourceRef) -> Result<(), GatewayError>;

    /// Live configuration of a resource.
    async fn get_resource_config(&self, resource: &ResourceRef) -> Result<serde_json::Value, GatewayError>;

    /// Runtime version keys available for clusters.
    async fn list_runtime_versions(&self) -> Result<Vec<String>, GatewayError>;

    async fn get_grants(&self, resource: &ResourceRef) -> Result<Vec<AclEntry>, GatewayError>;

    /// Add grants; existing grants of other principals are left alone.
    async fn set_grants(&self, resource: &ResourceRef, grants: &[Grant]) -> Result<(), GatewayError>;

    /// Remove every direct grant of one principal.
    async fn delete_grant(&self, principal: &str, resource: &ResourceRef) -> Result<(), GatewayError>;
}
