//! Update mode: converge a resource, its access groups and their grants.

use crate::diff::{GrantChange, diff_grants, missing_groups};
use crate::error::ReconcileError;
use crate::plan::{Action, Plan, PlanMode, Target};
use crate::state::{CurrentGrants, StateExtractor};
use dbsetup_core::config::cluster::{MANAGED_CLUSTER_KEYS, is_subset};
use dbsetup_core::{
    ClusterTemplate, Grant, LifecycleStatus, ManagedResource, ResourceKind, ResourceName, ResourceSpec,
    ScopeBackend, config::select_runtime_version, derive_access_groups,
};
use dbsetup_gateway::{GatewayError, RemoteGateway};

/// Request to converge one cluster.
#[derive(Debug, Clone)]
pub struct ClusterUpdate {
    pub name: ResourceName,
    /// Leave a newly created cluster running instead of terminating it.
    pub keep_running: bool,
}

/// Request to converge one key-vault backed secret scope.
#[derive(Debug, Clone)]
pub struct ScopeUpdate {
    pub name: ResourceName,
    pub key_vault: String,
    pub resource_id: String,
    /// Delete and recreate the scope if it already exists.
    pub force: bool,
}

/// Every cluster whose name matches is converged. With no match the cluster
/// is created and, unless asked to keep running, terminated straight away.
pub async fn plan_cluster_update(
    gateway: &dyn RemoteGateway,
    template: &ClusterTemplate,
    request: &ClusterUpdate,
) -> Result<Plan, ReconcileError> {
    let state = StateExtractor::new(gateway);
    let name = &request.name;
    let mut plan = Plan::new(PlanMode::Update);

    let existing = matches(state.matching(name).await?, name);
    let spark_version = latest_runtime(gateway).await?;

    let mut targets = Vec::new();
    if existing.is_empty() {
        let spec = ResourceSpec::Cluster {
            name: name.as_str().to_string(),
            config: template.to_spec(name.as_str(), &spark_version),
        };
        plan.push(Action::CreateResource { spec, elevated: false });
        let target = Target::new(ResourceKind::Cluster, name.as_str(), None);
        if name.kind().parks_after_create() && !request.keep_running {
            plan.push(Action::TerminateResource {
                target: target.clone(),
            });
        }
        targets.push((target, CurrentGrants::default()));
    }

    for cluster in existing {
        let target = Target::new(ResourceKind::Cluster, cluster.name.clone(), cluster.id.clone());
        let Some(reference) = target.reference() else {
            return Err(ReconcileError::Configuration(format!(
                "cluster {} is listed without an id",
                cluster.name
            )));
        };

        let desired = template.to_spec(&cluster.name, &spark_version);
        let live = gateway
            .get_resource_config(&reference)
            .await
            .map_err(ReconcileError::query(format!("cluster configuration of {}", reference.id)))?;

        if !is_subset(&managed_view(&desired), &live) {
            if cluster.status == LifecycleStatus::Terminated {
                plan.push(Action::UpdateResource {
                    target: target.clone(),
                    spec: ResourceSpec::Cluster {
                        name: cluster.name.clone(),
                        config: desired,
                    },
                });
            } else {
                tracing::warn!(
                    cluster = %target.label(),
                    status = %cluster.status,
                    "Cluster configuration differs but the cluster is not terminated; leaving it unchanged"
                );
            }
        }

        let current = state.list_grants(&reference).await?;
        targets.push((target, current));
    }

    plan_access(&state, &mut plan, name, &targets).await?;
    Ok(plan)
}

/// An existing scope is kept unless `force` is set, in which case it is
/// deleted and created again under the elevated profile.
pub async fn plan_scope_update(gateway: &dyn RemoteGateway, request: &ScopeUpdate) -> Result<Plan, ReconcileError> {
    let state = StateExtractor::new(gateway);
    let name = &request.name;
    let mut plan = Plan::new(PlanMode::Update);
    let recreate = request.force && name.kind().recreates_on_force();

    let existing = matches(state.matching(name).await?, name);
    let mut targets = Vec::new();
    for scope in &existing {
        let target = Target::new(ResourceKind::Scope, scope.name.clone(), scope.id.clone());
        if recreate {
            plan.push(Action::DeleteResource {
                target,
                verify_absent: true,
            });
            continue;
        }

        tracing::warn!(
            scope = %scope.name,
            "Scope already exists and will not be recreated; use -f to force"
        );
        let current = match target.reference() {
            Some(reference) => state.list_grants(&reference).await?,
            None => CurrentGrants::default(),
        };
        targets.push((target, current));
    }

    if recreate || existing.is_empty() {
        plan.push(Action::CreateResource {
            spec: ResourceSpec::Scope {
                name: name.as_str().to_string(),
                backend: ScopeBackend::key_vault(&request.key_vault, request.resource_id.clone()),
            },
            elevated: true,
        });
        targets.push((
            Target::new(ResourceKind::Scope, name.as_str(), Some(name.as_str().to_string())),
            CurrentGrants::default(),
        ));
    }

    plan_access(&state, &mut plan, name, &targets).await?;
    Ok(plan)
}

/// Missing groups first, then grant changes per target, shared by both kinds.
async fn plan_access(
    state: &StateExtractor<'_>,
    plan: &mut Plan,
    name: &ResourceName,
    targets: &[(Target, CurrentGrants)],
) -> Result<(), ReconcileError> {
    let groups = derive_access_groups(name);
    let live_groups = state.list_groups().await?;
    for group in missing_groups(&groups, &live_groups) {
        plan.push(Action::CreateGroup { name: group });
    }

    let desired: Vec<Grant> = groups.iter().map(|g| Grant::new(g.name.clone(), g.level)).collect();
    for (target, current) in targets {
        for change in diff_grants(&desired, &current.principals) {
            plan.push(match change {
                GrantChange::Add(grant) => Action::GrantPermission {
                    target: target.clone(),
                    grant,
                },
                GrantChange::Remove(held) => Action::DeleteGrant {
                    target: target.clone(),
                    principal: held.principal,
                    levels: held.levels,
                },
            });
        }
    }
    Ok(())
}

fn matches(found: Vec<ManagedResource>, name: &ResourceName) -> Vec<ManagedResource> {
    if found.len() > 1 {
        tracing::warn!(
            kind = %name.kind(),
            name = %name.as_str(),
            count = found.len(),
            "Several resources match; converging each of them"
        );
    }
    found
}

async fn latest_runtime(gateway: &dyn RemoteGateway) -> Result<String, ReconcileError> {
    let versions = gateway
        .list_runtime_versions()
        .await
        .map_err(ReconcileError::query("cluster runtime versions"))?;
    select_runtime_version(versions.iter().map(String::as_str)).ok_or_else(|| ReconcileError::RemoteQuery {
        operation: "cluster runtime versions".to_string(),
        source: GatewayError::malformed("clusters spark-versions", "no general-purpose runtime offered"),
    })
}

/// The part of a cluster spec compared for drift.
fn managed_view(spec: &serde_json::Value) -> serde_json::Value {
    let mut view = serde_json::Map::new();
    if let Some(obj) = spec.as_object() {
        for key in MANAGED_CLUSTER_KEYS {
            if let Some(value) = obj.get(*key) {
                view.insert((*key).to_string(), value.clone());
            }
        }
    }
    serde_json::Value::Object(view)
}
