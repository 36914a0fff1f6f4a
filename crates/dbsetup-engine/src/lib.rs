//! # dbsetup-engine
//!
//! Reconciliation of clusters and secret scopes against a live workspace.
//!
//! A run reads current state through the [`StateExtractor`], builds a
//! [`Plan`] with the update or delete planner, passes it through the
//! [`ConfirmationGate`] and applies it with the [`PlanExecutor`]:
//!
//! ```text
//! StateExtractor ──► plan_*_update / plan_delete ──► ConfirmationGate ──► PlanExecutor
//! ```
//!
//! Nothing runs concurrently. Each remote call completes before the next is
//! issued, and the first failed call ends the run.

pub mod context;
pub mod delete;
pub mod diff;
pub mod error;
pub mod executor;
pub mod gate;
pub mod plan;
pub mod state;
pub mod update;

pub use context::{
    BufferSink, Confirm, ExecutionContext, OutputSink, ScriptedConfirm, StdoutSink, TerminalConfirm, is_affirmative,
};
pub use delete::{DeleteSelection, plan_delete};
pub use diff::{GrantChange, diff_grants, missing_groups};
pub use error::ReconcileError;
pub use executor::{ApplyReport, PlanExecutor, ResourceStatus, run_plan};
pub use gate::ConfirmationGate;
pub use plan::{Action, Plan, PlanMode, Target};
pub use state::{CurrentGrants, StateExtractor};
pub use update::{ClusterUpdate, ScopeUpdate, plan_cluster_update, plan_scope_update};
