//! Cluster ACLs through the REST permissions API.
//!
//! `GET`, `PATCH` and `PUT` on `{host}/api/{version}/permissions/clusters/{id}`
//! with the profile's bearer token. `PATCH` adds entries; `PUT` replaces the
//! whole direct ACL, which is how a single principal is removed.

use crate::error::GatewayError;
use crate::gateway::{AclEntry, AclPermission};
use dbsetup_core::{Grant, PermissionLevel, ProfileConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ObjectPermissions {
    #[serde(default)]
    access_control_list: Vec<AccessControlResponse>,
}

#[derive(Debug, Deserialize)]
struct AccessControlResponse {
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    group_name: Option<String>,
    #[serde(default)]
    service_principal_name: Option<String>,
    #[serde(default)]
    all_permissions: Vec<PermissionResponse>,
}

impl AccessControlResponse {
    fn principal(&self) -> Option<(PrincipalKey, &str)> {
        if let Some(name) = &self.group_name {
            return Some((PrincipalKey::Group, name));
        }
        if let Some(name) = &self.user_name {
            return Some((PrincipalKey::User, name));
        }
        self.service_principal_name
            .as_deref()
            .map(|name| (PrincipalKey::ServicePrincipal, name))
    }
}

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    permission_level: String,
    #[serde(default)]
    inherited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrincipalKey {
    User,
    Group,
    ServicePrincipal,
}

#[derive(Debug, Serialize, PartialEq)]
struct AccessControlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_principal_name: Option<String>,
    permission_level: PermissionLevel,
}

impl AccessControlRequest {
    fn new(key: PrincipalKey, principal: &str, level: PermissionLevel) -> Self {
        let name = Some(principal.to_string());
        let (user_name, group_name, service_principal_name) = match key {
            PrincipalKey::User => (name, None, None),
            PrincipalKey::Group => (None, name, None),
            PrincipalKey::ServicePrincipal => (None, None, name),
        };
        Self {
            user_name,
            group_name,
            service_principal_name,
            permission_level: level,
        }
    }
}

#[derive(Debug, Serialize)]
struct AccessControlUpdate {
    access_control_list: Vec<AccessControlRequest>,
}

/// Client for cluster permissions, bound to one profile's host and token.
#[derive(Clone)]
pub struct PermissionsClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl PermissionsClient {
    pub fn new(profile: &ProfileConfig, api_version: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: profile.api_base(api_version),
            token: profile.token.clone(),
        }
    }

    fn url(&self, cluster_id: &str) -> String {
        format!("{}/permissions/clusters/{}", self.api_base, cluster_id)
    }

    async fn fetch(&self, cluster_id: &str) -> Result<ObjectPermissions, GatewayError> {
        let url = self.url(cluster_id);
        tracing::debug!(url = %url, "Fetching cluster permissions");

        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        let response = check_status("GET", &url, response).await?;
        response
            .json::<ObjectPermissions>()
            .await
            .map_err(|e| GatewayError::malformed(format!("GET {}", url), e))
    }

    async fn send_update(
        &self,
        method: reqwest::Method,
        cluster_id: &str,
        body: &AccessControlUpdate,
    ) -> Result<(), GatewayError> {
        let url = self.url(cluster_id);
        let label = if method == reqwest::Method::PUT { "PUT" } else { "PATCH" };
        let response = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        check_status(label, &url, response).await?;
        Ok(())
    }

    /// Current ACL of a cluster. Entries without a principal name are skipped.
    pub async fn get(&self, cluster_id: &str) -> Result<Vec<AclEntry>, GatewayError> {
        let permissions = self.fetch(cluster_id).await?;
        let operation = format!("GET permissions/clusters/{}", cluster_id);

        let mut entries = Vec::new();
        for acl in &permissions.access_control_list {
            let Some((_, principal)) = acl.principal() else {
                tracing::debug!(cluster_id, "Skipping ACL entry without a principal");
                continue;
            };
            let permissions = acl
                .all_permissions
                .iter()
                .map(|p| {
                    Ok(AclPermission {
                        level: p
                            .permission_level
                            .parse()
                            .map_err(|e| GatewayError::malformed(operation.clone(), e))?,
                        inherited: p.inherited,
                    })
                })
                .collect::<Result<Vec<_>, GatewayError>>()?;
            entries.push(AclEntry {
                principal: principal.to_string(),
                permissions,
            });
        }
        Ok(entries)
    }

    /// Add group grants to a cluster.
    pub async fn add(&self, cluster_id: &str, grants: &[Grant]) -> Result<(), GatewayError> {
        let body = AccessControlUpdate {
            access_control_list: grants
                .iter()
                .map(|g| AccessControlRequest::new(PrincipalKey::Group, &g.principal, g.level))
                .collect(),
        };
        self.send_update(reqwest::Method::PATCH, cluster_id, &body).await
    }

    /// Remove every direct grant of one principal, keeping all other direct grants.
    pub async fn remove_principal(&self, cluster_id: &str, principal: &str) -> Result<(), GatewayError> {
        let current = self.fetch(cluster_id).await?;
        let operation = format!("GET permissions/clusters/{}", cluster_id);

        let mut keep = Vec::new();
        for acl in &current.access_control_list {
            let Some((key, name)) = acl.principal() else {
                continue;
            };
            if name == principal {
                continue;
            }
            for p in acl.all_permissions.iter().filter(|p| !p.inherited) {
                let level = p
                    .permission_level
                    .parse()
                    .map_err(|e| GatewayError::malformed(operation.clone(), e))?;
                keep.push(AccessControlRequest::new(key, name, level));
            }
        }

        let body = AccessControlUpdate {
            access_control_list: keep,
        };
        self.send_update(reqwest::Method::PUT, cluster_id, &body).await
    }
}

async fn check_status(
    method: &'static str,
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, GatewayError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Http {
        method,
        url: url.to_string(),
        status,
        body,
    })
}
