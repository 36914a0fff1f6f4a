//! The production [`RemoteGateway`]: CLI for resources, groups and scope ACLs,
//! REST for cluster ACLs.

use crate::cli::DatabricksCli;
use crate::error::GatewayError;
use crate::gateway::{AclEntry, RemoteGateway};
use crate::permissions::PermissionsClient;
use crate::runner::{CliRunner, ProcessRunner};
use async_trait::async_trait;
use dbsetup_core::{Grant, ManagedResource, ProfileConfig, ResourceKind, ResourceRef, ResourceSpec};

pub struct WorkspaceGateway<R> {
    cli: DatabricksCli<R>,
    permissions: PermissionsClient,
}

impl<R: CliRunner> WorkspaceGateway<R> {
    pub fn new(cli: DatabricksCli<R>, permissions: PermissionsClient) -> Self {
        Self { cli, permissions }
    }
}

impl WorkspaceGateway<ProcessRunner> {
    /// Gateway running `cli_binary` as a subprocess under `profile`.
    pub fn for_profile(cli_binary: &str, profile: &ProfileConfig, api_version: &str) -> Self {
        Self::new(
            DatabricksCli::new(ProcessRunner::new(cli_binary), profile.name.clone()),
            PermissionsClient::new(profile, api_version),
        )
    }
}

#[async_trait]
impl<R: CliRunner> RemoteGateway for WorkspaceGateway<R> {
    async fn list_groups(&self) -> Result<Vec<String>, GatewayError> {
        self.cli.list_groups().await
    }

    async fn create_group(&self, name: &str) -> Result<(), GatewayError> {
        self.cli.create_group(name).await
    }

    async fn delete_group(&self, name: &str) -> Result<(), GatewayError> {
        self.cli.delete_group(name).await
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ManagedResource>, GatewayError> {
        match kind {
            ResourceKind::Cluster => self.cli.list_clusters().await,
            ResourceKind::Scope => self.cli.list_scopes().await,
        }
    }

    async fn create_resource(
        &self,
        spec: &ResourceSpec,
        profile_override: Option<&str>,
    ) -> Result<String, GatewayError> {
        self.cli.create(spec, profile_override).await
    }

    async fn update_resource(&self, resource: &ResourceRef, spec: &ResourceSpec) -> Result<(), GatewayError> {
        match spec {
            ResourceSpec::Cluster { config, .. } => {
                let mut payload = config.clone();
                if let Some(obj) = payload.as_object_mut() {
                    obj.insert(
                        "cluster_id".to_string(),
                        serde_json::Value::String(resource.id.clone()),
                    );
                }
                self.cli.edit_cluster(&payload).await
            }
            ResourceSpec::Scope { .. } => Err(GatewayError::Unsupported {
                operation: "update",
                kind: ResourceKind::Scope,
            }),
        }
    }

    async fn terminate_resource(&self, resource: &ResourceRef) -> Result<(), GatewayError> {
        match resource.kind {
            ResourceKind::Cluster => self.cli.terminate_cluster(&resource.id).await,
            kind => Err(GatewayError::Unsupported {
                operation: "terminate",
                kind,
            }),
        }
    }

    async fn delete_resource(&self, resource: &ResourceRef) -> Result<(), GatewayError> {
        match resource.kind {
            ResourceKind::Cluster => self.cli.permanent_delete_cluster(&resource.id).await,
            ResourceKind::Scope => self.cli.delete_scope(&resource.id).await,
        }
    }

    async fn get_resource_config(&self, resource: &ResourceRef) -> Result<serde_json::Value, GatewayError> {
        match resource.kind {
            ResourceKind::Cluster => self.cli.get_cluster(&resource.id).await,
            kind => Err(GatewayError::Unsupported {
                operation: "get configuration",
                kind,
            }),
        }
    }

    async fn list_runtime_versions(&self) -> Result<Vec<String>, GatewayError> {
        self.cli.spark_versions().await
    }

    async fn get_grants(&self, resource: &ResourceRef) -> Result<Vec<AclEntry>, GatewayError> {
        match resource.kind {
            ResourceKind::Cluster => self.permissions.get(&resource.id).await,
            ResourceKind::Scope => self.cli.list_scope_acls(&resource.id).await,
        }
    }

    async fn set_grants(&self, resource: &ResourceRef, grants: &[Grant]) -> Result<(), GatewayError> {
        match resource.kind {
            ResourceKind::Cluster => self.permissions.add(&resource.id, grants).await,
            ResourceKind::Scope => {
                for grant in grants {
                    self.cli.put_scope_acl(&resource.id, grant).await?;
                }
                Ok(())
            }
        }
    }

    async fn delete_grant(&self, principal: &str, resource: &ResourceRef) -> Result<(), GatewayError> {
        match resource.kind {
            ResourceKind::Cluster => self.permissions.remove_principal(&resource.id, principal).await,
            ResourceKind::Scope => self.cli.delete_scope_acl(&resource.id, principal).await,
        }
    }
}
