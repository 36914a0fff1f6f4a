//! Shared test infrastructure for reconciliation tests.
//!
//! This module provides:
//! - An in-memory workspace implementing `RemoteGateway` that records calls
//! - A fake elevated-credential provider
//! - Helpers for building execution contexts

#![allow(dead_code)]

use async_trait::async_trait;
use dbsetup_core::{
    Grant, LifecycleStatus, ManagedResource, PermissionLevel, ResourceKind, ResourceRef, ResourceSpec,
};
use dbsetup_credential::{CredentialError, ElevatedCredentials, ElevatedProfile, REMEDIATION};
use dbsetup_engine::{BufferSink, ExecutionContext, ScriptedConfirm};
use dbsetup_gateway::{AclEntry, AclPermission, GatewayError, RemoteGateway};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// IN-MEMORY WORKSPACE
// =============================================================================

#[derive(Default)]
struct WorkspaceState {
    clusters: Vec<ManagedResource>,
    scopes: Vec<ManagedResource>,
    groups: Vec<String>,
    acls: HashMap<String, Vec<AclEntry>>,
    configs: HashMap<String, Value>,
    runtime_versions: Vec<String>,
    next_id: u32,
    fail_on: Option<String>,
    scope_survives_delete: bool,
}

/// A workspace that lives in memory and records every gateway call.
///
/// Calls are recorded as `"<operation> <args…>"`, e.g.
/// `"create_group cluster-etl-manage"` or `"delete_grant ops 0101-abc"`.
pub struct FakeWorkspace {
    state: Mutex<WorkspaceState>,
    calls: Mutex<Vec<String>>,
}

impl Default for FakeWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeWorkspace {
    pub fn new() -> Self {
        let state = WorkspaceState {
            runtime_versions: vec![
                "12.2.x-scala2.12".to_string(),
                "13.3.x-scala2.12".to_string(),
                "14.3.x-photon-scala2.12".to_string(),
                "13.3.x-gpu-ml-scala2.12".to_string(),
            ],
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_cluster(self, id: &str, name: &str, status: LifecycleStatus) -> Self {
        self.state
            .lock()
            .unwrap()
            .clusters
            .push(ManagedResource::cluster(id, name, status));
        self
    }

    pub fn with_cluster_config(self, id: &str, config: Value) -> Self {
        self.state.lock().unwrap().configs.insert(id.to_string(), config);
        self
    }

    pub fn with_scope(self, name: &str) -> Self {
        self.state.lock().unwrap().scopes.push(ManagedResource::scope(
            name,
            Some("AZURE_KEYVAULT".to_string()),
            Some(format!("https://{}.vault.azure.net/", name)),
        ));
        self
    }

    pub fn with_group(self, name: &str) -> Self {
        self.state.lock().unwrap().groups.push(name.to_string());
        self
    }

    pub fn with_grant(self, resource_id: &str, principal: &str, level: PermissionLevel) -> Self {
        self.add_permission(resource_id, principal, level, false);
        self
    }

    pub fn with_inherited_grant(self, resource_id: &str, principal: &str, level: PermissionLevel) -> Self {
        self.add_permission(resource_id, principal, level, true);
        self
    }

    /// Make every call whose recorded form starts with `prefix` fail.
    pub fn failing_on(self, prefix: &str) -> Self {
        self.state.lock().unwrap().fail_on = Some(prefix.to_string());
        self
    }

    /// Deleted scopes stay listed, as if the delete silently did nothing.
    pub fn with_sticky_scopes(self) -> Self {
        self.state.lock().unwrap().scope_survives_delete = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls that change workspace state.
    pub fn mutations(&self) -> Vec<String> {
        const READS: &[&str] = &[
            "list_groups",
            "list_resources",
            "get_grants",
            "get_resource_config",
            "list_runtime_versions",
        ];
        self.calls()
            .into_iter()
            .filter(|c| !READS.iter().any(|r| c.starts_with(r)))
            .collect()
    }

    pub fn groups(&self) -> Vec<String> {
        self.state.lock().unwrap().groups.clone()
    }

    pub fn clusters(&self) -> Vec<ManagedResource> {
        self.state.lock().unwrap().clusters.clone()
    }

    pub fn scopes(&self) -> Vec<ManagedResource> {
        self.state.lock().unwrap().scopes.clone()
    }

    /// Direct grants on a resource, one per principal and level.
    pub fn grants_on(&self, resource_id: &str) -> Vec<Grant> {
        let state = self.state.lock().unwrap();
        state
            .acls
            .get(resource_id)
            .map(|entries| {
                entries
                    .iter()
                    .flat_map(|e| {
                        e.direct_levels()
                            .into_iter()
                            .map(|level| Grant::new(e.principal.clone(), level))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn add_permission(&self, resource_id: &str, principal: &str, level: PermissionLevel, inherited: bool) {
        let mut state = self.state.lock().unwrap();
        let entries = state.acls.entry(resource_id.to_string()).or_default();
        let permission = AclPermission { level, inherited };
        match entries.iter_mut().find(|e| e.principal == principal) {
            Some(entry) => entry.permissions.push(permission),
            None => entries.push(AclEntry {
                principal: principal.to_string(),
                permissions: vec![permission],
            }),
        }
    }

    fn record(&self, call: String) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call.clone());
        let fail = self
            .state
            .lock()
            .unwrap()
            .fail_on
            .as_ref()
            .is_some_and(|prefix| call.starts_with(prefix.as_str()));
        if fail {
            return Err(GatewayError::CommandFailed {
                command: call,
                code: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteGateway for FakeWorkspace {
    async fn list_groups(&self) -> Result<Vec<String>, GatewayError> {
        self.record("list_groups".to_string())?;
        Ok(self.groups())
    }

    async fn create_group(&self, name: &str) -> Result<(), GatewayError> {
        self.record(format!("create_group {}", name))?;
        self.state.lock().unwrap().groups.push(name.to_string());
        Ok(())
    }

    async fn delete_group(&self, name: &str) -> Result<(), GatewayError> {
        self.record(format!("delete_group {}", name))?;
        self.state.lock().unwrap().groups.retain(|g| g != name);
        Ok(())
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ManagedResource>, GatewayError> {
        self.record(format!("list_resources {}", kind))?;
        Ok(match kind {
            ResourceKind::Cluster => self.clusters(),
            ResourceKind::Scope => self.scopes(),
        })
    }

    async fn create_resource(
        &self,
        spec: &ResourceSpec,
        profile_override: Option<&str>,
    ) -> Result<String, GatewayError> {
        let mut call = format!("create_resource {} {}", spec.kind(), spec.name());
        if let Some(profile) = profile_override {
            call.push_str(&format!(" --profile {}", profile));
        }
        self.record(call)?;

        let mut state = self.state.lock().unwrap();
        match spec {
            ResourceSpec::Cluster { name, config } => {
                state.next_id += 1;
                let id = format!("0101-{:06}", state.next_id);
                state
                    .clusters
                    .push(ManagedResource::cluster(id.clone(), name.clone(), LifecycleStatus::Pending));
                let mut live = config.clone();
                live["cluster_id"] = Value::String(id.clone());
                state.configs.insert(id.clone(), live);
                Ok(id)
            }
            ResourceSpec::Scope { name, .. } => {
                if state.scopes.iter().any(|s| s.name == *name) {
                    return Err(GatewayError::CommandFailed {
                        command: format!("create_resource scope {}", name),
                        code: Some(1),
                        stderr: format!("Scope {} already exists!", name),
                    });
                }
                state.scopes.push(ManagedResource::scope(name.clone(), None, None));
                Ok(name.clone())
            }
        }
    }

    async fn update_resource(&self, resource: &ResourceRef, spec: &ResourceSpec) -> Result<(), GatewayError> {
        self.record(format!("update_resource {}", resource.id))?;
        if let ResourceSpec::Cluster { config, .. } = spec {
            let mut live = config.clone();
            live["cluster_id"] = Value::String(resource.id.clone());
            self.state.lock().unwrap().configs.insert(resource.id.clone(), live);
        }
        Ok(())
    }

    async fn terminate_resource(&self, resource: &ResourceRef) -> Result<(), GatewayError> {
        self.record(format!("terminate_resource {}", resource.id))?;
        let mut state = self.state.lock().unwrap();
        if let Some(cluster) = state.clusters.iter_mut().find(|c| c.id.as_deref() == Some(resource.id.as_str())) {
            cluster.status = LifecycleStatus::Terminated;
        }
        Ok(())
    }

    async fn delete_resource(&self, resource: &ResourceRef) -> Result<(), GatewayError> {
        self.record(format!("delete_resource {} {}", resource.kind, resource.id))?;
        let mut state = self.state.lock().unwrap();
        match resource.kind {
            ResourceKind::Cluster => {
                state.clusters.retain(|c| c.id.as_deref() != Some(resource.id.as_str()));
                state.configs.remove(&resource.id);
            }
            ResourceKind::Scope => {
                if !state.scope_survives_delete {
                    state.scopes.retain(|s| s.name != resource.id);
                }
            }
        }
        state.acls.remove(&resource.id);
        Ok(())
    }

    async fn get_resource_config(&self, resource: &ResourceRef) -> Result<Value, GatewayError> {
        self.record(format!("get_resource_config {}", resource.id))?;
        self.state
            .lock()
            .unwrap()
            .configs
            .get(&resource.id)
            .cloned()
            .ok_or_else(|| GatewayError::malformed("clusters get", "no such cluster"))
    }

    async fn list_runtime_versions(&self) -> Result<Vec<String>, GatewayError> {
        self.record("list_runtime_versions".to_string())?;
        Ok(self.state.lock().unwrap().runtime_versions.clone())
    }

    async fn get_grants(&self, resource: &ResourceRef) -> Result<Vec<AclEntry>, GatewayError> {
        self.record(format!("get_grants {}", resource.id))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .acls
            .get(&resource.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_grants(&self, resource: &ResourceRef, grants: &[Grant]) -> Result<(), GatewayError> {
        let rendered: Vec<String> = grants
            .iter()
            .map(|g| format!("{}={}", g.principal, g.level))
            .collect();
        self.record(format!("set_grants {} {}", resource.id, rendered.join(",")))?;
        for grant in grants {
            self.add_permission(&resource.id, &grant.principal, grant.level, false);
        }
        Ok(())
    }

    async fn delete_grant(&self, principal: &str, resource: &ResourceRef) -> Result<(), GatewayError> {
        self.record(format!("delete_grant {} {}", principal, resource.id))?;
        let mut state = self.state.lock().unwrap();
        if let Some(entries) = state.acls.get_mut(&resource.id) {
            for entry in entries.iter_mut().filter(|e| e.principal == principal) {
                entry.permissions.retain(|p| p.inherited);
            }
            entries.retain(|e| !e.permissions.is_empty());
        }
        Ok(())
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Hands out a fixed elevated profile, or fails as if the token were missing.
pub struct FakeElevation {
    profile: Option<String>,
    calls: AtomicUsize,
}

impl FakeElevation {
    pub fn ready(profile: &str) -> Self {
        Self {
            profile: Some(profile.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn missing_token() -> Self {
        Self {
            profile: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ElevatedCredentials for FakeElevation {
    fn ensure_elevated(&self) -> Result<ElevatedProfile, CredentialError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.profile {
            Some(name) => Ok(ElevatedProfile { name: name.clone() }),
            None => Err(CredentialError::Missing {
                path: PathBuf::from("~/.azure/accessTokens.json"),
                remediation: REMEDIATION,
            }),
        }
    }
}

// =============================================================================
// CONTEXT HELPERS
// =============================================================================

pub struct Harness {
    pub workspace: Arc<FakeWorkspace>,
    pub output: Arc<BufferSink>,
    pub confirm: Arc<ScriptedConfirm>,
    pub elevation: Arc<FakeElevation>,
    pub ctx: ExecutionContext,
}

/// Context over `workspace` whose prompt always answers `answer`.
pub fn harness(workspace: FakeWorkspace, answer: &str) -> Harness {
    harness_with(workspace, answer, FakeElevation::ready("AAD"))
}

pub fn harness_with(workspace: FakeWorkspace, answer: &str, elevation: FakeElevation) -> Harness {
    let workspace = Arc::new(workspace);
    let output = Arc::new(BufferSink::default());
    let confirm = Arc::new(ScriptedConfirm::new(answer));
    let elevation = Arc::new(elevation);
    let ctx = ExecutionContext::new("DEFAULT", workspace.clone())
        .with_output(output.clone())
        .with_confirm(confirm.clone())
        .with_credentials(elevation.clone());
    Harness {
        workspace,
        output,
        confirm,
        elevation,
        ctx,
    }
}
