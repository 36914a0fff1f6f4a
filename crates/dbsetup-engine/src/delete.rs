//! Delete mode: remove a resource's grants, access groups and the resource.

use crate::error::ReconcileError;
use crate::plan::{Action, Plan, PlanMode, Target};
use crate::state::StateExtractor;
use dbsetup_core::{ResourceName, derive_access_groups};
use dbsetup_gateway::RemoteGateway;

/// Which categories the operator asked to delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSelection {
    pub all: bool,
    pub resource: bool,
    pub groups: bool,
    pub grants: bool,
}

impl DeleteSelection {
    pub fn resource(&self) -> bool {
        self.all || self.resource
    }

    pub fn groups(&self) -> bool {
        self.all || self.groups
    }

    pub fn grants(&self) -> bool {
        self.all || self.grants
    }

    pub fn is_empty(&self) -> bool {
        !(self.resource() || self.groups() || self.grants())
    }
}

/// Build the delete plan for `name`.
///
/// Actions are ordered grants, then groups, then resources. Categories that
/// were not selected, or that have nothing to delete, are left out. Nothing
/// is queried when no category is selected.
pub async fn plan_delete(
    gateway: &dyn RemoteGateway,
    name: &ResourceName,
    selection: DeleteSelection,
) -> Result<Plan, ReconcileError> {
    let mut plan = Plan::new(PlanMode::Delete);
    if selection.is_empty() {
        return Ok(plan);
    }

    let state = StateExtractor::new(gateway);
    let resources = state.matching(name).await?;
    let targets: Vec<Target> = resources
        .iter()
        .filter(|r| r.id.is_some())
        .map(|r| Target::new(r.kind, r.name.clone(), r.id.clone()))
        .collect();

    if selection.grants() {
        for target in &targets {
            let Some(reference) = target.reference() else {
                continue;
            };
            let current = state.list_grants(&reference).await?;
            for principal in current.principals {
                plan.push(Action::DeleteGrant {
                    target: target.clone(),
                    principal: principal.principal,
                    levels: principal.levels,
                });
            }
        }
    }

    if selection.groups() {
        let live = state.list_groups().await?;
        for group in derive_access_groups(name).names() {
            if live.contains(group) {
                plan.push(Action::DeleteGroup {
                    name: group.to_string(),
                });
            }
        }
    }

    if selection.resource() {
        for target in targets {
            plan.push(Action::DeleteResource {
                target,
                verify_absent: false,
            });
        }
    }

    Ok(plan)
}
