//! Applying a plan against the workspace.
//!
//! Actions run one at a time in plan order. The first failure stops the run;
//! actions already applied stay applied.

use crate::context::ExecutionContext;
use crate::error::ReconcileError;
use crate::gate::ConfirmationGate;
use crate::plan::{Action, Plan, Target};
use dbsetup_core::{LifecycleStatus, ResourceKind, ResourceRef};
use dbsetup_gateway::GatewayError;
use std::collections::HashMap;

/// Lifecycle status recorded for a resource touched by the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStatus {
    pub kind: ResourceKind,
    pub name: String,
    pub status: LifecycleStatus,
}

/// What an apply run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Descriptions of executed actions, in order.
    pub executed: Vec<String>,
    pub statuses: Vec<ResourceStatus>,
}

impl ApplyReport {
    fn record_status(&mut self, kind: ResourceKind, name: &str, status: LifecycleStatus) {
        match self.statuses.iter_mut().find(|s| s.kind == kind && s.name == name) {
            Some(existing) => existing.status = status,
            None => self.statuses.push(ResourceStatus {
                kind,
                name: name.to_string(),
                status,
            }),
        }
    }

    pub fn status_of(&self, kind: ResourceKind, name: &str) -> Option<LifecycleStatus> {
        self.statuses
            .iter()
            .find(|s| s.kind == kind && s.name == name)
            .map(|s| s.status)
    }
}

pub struct PlanExecutor<'a> {
    ctx: &'a ExecutionContext,
    /// Identifiers returned by creates in this run, keyed by kind and name.
    created: HashMap<(ResourceKind, String), String>,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(ctx: &'a ExecutionContext) -> Self {
        Self {
            ctx,
            created: HashMap::new(),
        }
    }

    pub async fn apply(mut self, plan: &Plan) -> Result<ApplyReport, ReconcileError> {
        let mut report = ApplyReport::default();
        for (index, action) in plan.actions().iter().enumerate() {
            let step = index + 1;
            let description = action.describe();
            if action.is_destructive() {
                tracing::warn!(step, action = %description, "Applying");
            } else {
                tracing::info!(step, action = %description, "Applying");
            }

            self.apply_one(step, action, &mut report).await?;
            report.executed.push(description);
        }
        tracing::info!(actions = report.executed.len(), "Plan applied");
        Ok(report)
    }

    async fn apply_one(&mut self, step: usize, action: &Action, report: &mut ApplyReport) -> Result<(), ReconcileError> {
        let gateway = self.ctx.gateway();
        let failed = |source: GatewayError| ReconcileError::RemoteApply {
            step,
            action: action.describe(),
            source,
        };

        match action {
            Action::CreateResource { spec, elevated } => {
                let profile = if *elevated {
                    let credentials = self.ctx.credentials.as_ref().ok_or_else(|| {
                        ReconcileError::Configuration(format!(
                            "creating {} {} needs elevated credentials, none configured",
                            spec.kind(),
                            spec.name()
                        ))
                    })?;
                    Some(credentials.ensure_elevated()?.name)
                } else {
                    None
                };

                let id = gateway
                    .create_resource(spec, profile.as_deref())
                    .await
                    .map_err(failed)?;
                tracing::info!(kind = %spec.kind(), name = %spec.name(), id = %id, "Created");

                let status = if spec.kind().parks_after_create() {
                    LifecycleStatus::Pending
                } else {
                    LifecycleStatus::Running
                };
                report.record_status(spec.kind(), spec.name(), status);
                self.created.insert((spec.kind(), spec.name().to_string()), id);
            }
            Action::UpdateResource { target, spec } => {
                let reference = self.resolve(step, target)?;
                gateway.update_resource(&reference, spec).await.map_err(failed)?;
            }
            Action::TerminateResource { target } => {
                let reference = self.resolve(step, target)?;
                gateway.terminate_resource(&reference).await.map_err(failed)?;
                report.record_status(target.kind, &target.name, LifecycleStatus::Terminated);
            }
            Action::DeleteResource { target, verify_absent } => {
                let reference = self.resolve(step, target)?;
                gateway.delete_resource(&reference).await.map_err(failed)?;
                if *verify_absent {
                    let remaining = gateway.list_resources(target.kind).await.map_err(failed)?;
                    if remaining
                        .iter()
                        .any(|r| target.kind.names_match(&r.name, &target.name))
                    {
                        return Err(ReconcileError::NotDeleted {
                            step,
                            kind: target.kind,
                            name: target.name.clone(),
                        });
                    }
                }
                report.record_status(target.kind, &target.name, LifecycleStatus::Absent);
            }
            Action::CreateGroup { name } => {
                gateway.create_group(name).await.map_err(failed)?;
            }
            Action::GrantPermission { target, grant } => {
                let reference = self.resolve(step, target)?;
                gateway
                    .set_grants(&reference, std::slice::from_ref(grant))
                    .await
                    .map_err(failed)?;
            }
            Action::DeleteGrant { target, principal, .. } => {
                let reference = self.resolve(step, target)?;
                gateway.delete_grant(principal, &reference).await.map_err(failed)?;
            }
            Action::DeleteGroup { name } => {
                gateway.delete_group(name).await.map_err(failed)?;
            }
        }
        Ok(())
    }

    fn resolve(&self, step: usize, target: &Target) -> Result<ResourceRef, ReconcileError> {
        if let Some(reference) = target.reference() {
            return Ok(reference);
        }
        self.created
            .get(&(target.kind, target.name.clone()))
            .map(|id| ResourceRef::new(target.kind, id.clone()))
            .ok_or_else(|| ReconcileError::Unresolved {
                step,
                kind: target.kind,
                name: target.name.clone(),
            })
    }
}

/// Render, gate and (if approved) apply a plan. `None` means nothing was applied.
pub async fn run_plan(
    ctx: &ExecutionContext,
    plan: &Plan,
    debug: bool,
    quiet: bool,
) -> Result<Option<ApplyReport>, ReconcileError> {
    let gate = ConfirmationGate::new(ctx.output.as_ref(), ctx.confirm.as_ref());
    if !gate.should_apply(plan, debug, quiet) {
        return Ok(None);
    }
    PlanExecutor::new(ctx).apply(plan).await.map(Some)
}
