//! Operations backed by the `databricks` CLI.
//!
//! Each method builds the argument list for one CLI call, runs it through a
//! [`CliRunner`] under the bound profile, and parses stdout (JSON or a
//! [`table`](crate::table) listing) into records.

use crate::error::GatewayError;
use crate::gateway::AclEntry;
use crate::runner::CliRunner;
use crate::table::{TableGrammar, parse_rows};
use dbsetup_core::{
    Grant, LifecycleStatus, ManagedResource, PermissionLevel, ResourceSpec, ScopeBackend,
};
use serde::Deserialize;

const CLUSTER_LISTING: TableGrammar = TableGrammar {
    has_header: false,
    min_columns: 3,
};

const SCOPE_LISTING: TableGrammar = TableGrammar {
    has_header: true,
    min_columns: 2,
};

const ACL_LISTING: TableGrammar = TableGrammar {
    has_header: true,
    min_columns: 2,
};

#[derive(Debug, Deserialize)]
struct GroupList {
    #[serde(default)]
    group_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedCluster {
    cluster_id: String,
}

#[derive(Debug, Deserialize)]
struct RuntimeVersions {
    #[serde(default)]
    versions: Vec<RuntimeVersion>,
}

#[derive(Debug, Deserialize)]
struct RuntimeVersion {
    key: String,
}

/// Typed wrapper over the CLI, bound to one profile.
pub struct DatabricksCli<R> {
    runner: R,
    profile: String,
}

impl<R: CliRunner> DatabricksCli<R> {
    pub fn new(runner: R, profile: impl Into<String>) -> Self {
        Self {
            runner,
            profile: profile.into(),
        }
    }

    async fn call(&self, args: &[&str], profile: Option<&str>) -> Result<String, GatewayError> {
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        full.push("--profile".to_string());
        full.push(profile.unwrap_or(&self.profile).to_string());
        self.runner.run(&full).await
    }

    // -----------------------------
    // groups
    // -----------------------------

    pub async fn list_groups(&self) -> Result<Vec<String>, GatewayError> {
        let out = self.call(&["groups", "list"], None).await?;
        if out.trim().is_empty() {
            return Ok(Vec::new());
        }
        let parsed: GroupList =
            serde_json::from_str(&out).map_err(|e| GatewayError::malformed("groups list", e))?;
        Ok(parsed.group_names)
    }

    pub async fn create_group(&self, name: &str) -> Result<(), GatewayError> {
        self.call(&["groups", "create", "--group-name", name], None).await?;
        Ok(())
    }

    pub async fn delete_group(&self, name: &str) -> Result<(), GatewayError> {
        self.call(&["groups", "delete", "--group-name", name], None).await?;
        Ok(())
    }

    // -----------------------------
    // clusters
    // -----------------------------

    pub async fn list_clusters(&self) -> Result<Vec<ManagedResource>, GatewayError> {
        let out = self.call(&["clusters", "list"], None).await?;
        parse_cluster_listing(&out)
    }

    pub async fn create_cluster(&self, config: &serde_json::Value) -> Result<String, GatewayError> {
        let payload = config.to_string();
        let out = self.call(&["clusters", "create", "--json", payload.as_str()], None).await?;
        let created: CreatedCluster =
            serde_json::from_str(&out).map_err(|e| GatewayError::malformed("clusters create", e))?;
        Ok(created.cluster_id)
    }

    pub async fn edit_cluster(&self, config: &serde_json::Value) -> Result<(), GatewayError> {
        let payload = config.to_string();
        self.call(&["clusters", "edit", "--json", payload.as_str()], None).await?;
        Ok(())
    }

    pub async fn get_cluster(&self, cluster_id: &str) -> Result<serde_json::Value, GatewayError> {
        let out = self.call(&["clusters", "get", "--cluster-id", cluster_id], None).await?;
        serde_json::from_str(&out).map_err(|e| GatewayError::malformed("clusters get", e))
    }

    /// Terminate (stop) a cluster. The cluster stays defined.
    pub async fn terminate_cluster(&self, cluster_id: &str) -> Result<(), GatewayError> {
        self.call(&["clusters", "delete", "--cluster-id", cluster_id], None).await?;
        Ok(())
    }

    pub async fn permanent_delete_cluster(&self, cluster_id: &str) -> Result<(), GatewayError> {
        self.call(&["clusters", "permanent-delete", "--cluster-id", cluster_id], None)
            .await?;
        Ok(())
    }

    pub async fn spark_versions(&self) -> Result<Vec<String>, GatewayError> {
        let out = self.call(&["clusters", "spark-versions"], None).await?;
        let parsed: RuntimeVersions = serde_json::from_str(&out)
            .map_err(|e| GatewayError::malformed("clusters spark-versions", e))?;
        Ok(parsed.versions.into_iter().map(|v| v.key).collect())
    }

    // -----------------------------
    // secret scopes
    // -----------------------------

    pub async fn list_scopes(&self) -> Result<Vec<ManagedResource>, GatewayError> {
        let out = self.call(&["secrets", "list-scopes"], None).await?;
        parse_scope_listing(&out)
    }

    pub async fn create_scope(
        &self,
        name: &str,
        backend: &ScopeBackend,
        profile: Option<&str>,
    ) -> Result<(), GatewayError> {
        match backend {
            ScopeBackend::AzureKeyVault {
                resource_id,
                dns_name,
            } => {
                self.call(
                    &[
                        "secrets",
                        "create-scope",
                        "--scope",
                        name,
                        "--scope-backend-type",
                        "AZURE_KEYVAULT",
                        "--resource-id",
                        resource_id.as_str(),
                        "--dns-name",
                        dns_name.as_str(),
                    ],
                    profile,
                )
                .await?;
            }
        }
        Ok(())
    }

    pub async fn delete_scope(&self, name: &str) -> Result<(), GatewayError> {
        self.call(&["secrets", "delete-scope", "--scope", name], None).await?;
        Ok(())
    }

    pub async fn list_scope_acls(&self, scope: &str) -> Result<Vec<AclEntry>, GatewayError> {
        let out = self.call(&["secrets", "list-acls", "--scope", scope], None).await?;
        parse_acl_listing(&out)
    }

    pub async fn put_scope_acl(&self, scope: &str, grant: &Grant) -> Result<(), GatewayError> {
        self.call(
            &[
                "secrets",
                "put-acl",
                "--scope",
                scope,
                "--principal",
                grant.principal.as_str(),
                "--permission",
                grant.level.as_str(),
            ],
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn delete_scope_acl(&self, scope: &str, principal: &str) -> Result<(), GatewayError> {
        self.call(
            &["secrets", "delete-acl", "--scope", scope, "--principal", principal],
            None,
        )
        .await?;
        Ok(())
    }

    /// Create a resource through the matching CLI command.
    pub async fn create(&self, spec: &ResourceSpec, profile: Option<&str>) -> Result<String, GatewayError> {
        match spec {
            ResourceSpec::Cluster { config, .. } => self.create_cluster(config).await,
            ResourceSpec::Scope { name, backend } => {
                self.create_scope(name, backend, profile).await?;
                Ok(name.clone())
            }
        }
    }
}

/// Parse `clusters list`: `<id> <name…> <state>`, no header.
pub fn parse_cluster_listing(raw: &str) -> Result<Vec<ManagedResource>, GatewayError> {
    let rows = parse_rows(raw, CLUSTER_LISTING).map_err(|e| GatewayError::malformed("clusters list", e))?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let last = row.len() - 1;
            ManagedResource::cluster(
                row[0].clone(),
                row[1..last].join(" "),
                LifecycleStatus::from_remote(&row[last]),
            )
        })
        .collect())
}

/// Parse `secrets list-scopes`: `<name> <backend> [<url>]` under a header.
pub fn parse_scope_listing(raw: &str) -> Result<Vec<ManagedResource>, GatewayError> {
    let rows = parse_rows(raw, SCOPE_LISTING).map_err(|e| GatewayError::malformed("secrets list-scopes", e))?;
    Ok(rows
        .into_iter()
        .map(|mut row| {
            let url = (row.len() > 2).then(|| row[2..].join(" ")).filter(|u| u != "N/A");
            row.truncate(2);
            let backend = row.pop();
            let name = row.pop().unwrap_or_default();
            ManagedResource::scope(name, backend, url)
        })
        .collect())
}

/// Parse `secrets list-acls`: `<principal…> <permission>` under a header.
pub fn parse_acl_listing(raw: &str) -> Result<Vec<AclEntry>, GatewayError> {
    let rows = parse_rows(raw, ACL_LISTING).map_err(|e| GatewayError::malformed("secrets list-acls", e))?;
    rows.into_iter()
        .map(|row| {
            let last = row.len() - 1;
            let level: PermissionLevel = row[last]
                .parse()
                .map_err(|e| GatewayError::malformed("secrets list-acls", e))?;
            Ok(AclEntry::direct(row[..last].join(" "), &[level]))
        })
        .collect()
}
