//! Command implementations for the `dbsetup` binary.
//!
//! `dbsetup cluster update|delete` - see [`cluster`].
//! `dbsetup scope update|delete` - see [`scope`].

pub mod cluster;
pub mod scope;

use crate::GlobalArgs;
use anyhow::Context;
use dbsetup_core::{DbSetupConfig, ProfileConfig, ProfileStore};
use dbsetup_engine::{ApplyReport, DeleteSelection, ExecutionContext};
use dbsetup_gateway::WorkspaceGateway;
use std::sync::Arc;

/// Delete-mode category and gate flags, shared by both resource kinds.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DeleteFlags {
    /// Delete everything: the resource, its groups and its permissions.
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Delete the permissions granted on the resource.
    #[arg(short = 'c', long = "acls")]
    pub acls: bool,

    /// Print the plan without applying it.
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Delete the derived access groups.
    #[arg(short = 'g', long = "groups")]
    pub groups: bool,

    /// Apply without asking for confirmation.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Delete the resource itself.
    #[arg(short = 's', long = "self")]
    pub resource: bool,
}

impl DeleteFlags {
    pub fn selection(&self) -> DeleteSelection {
        DeleteSelection {
            all: self.all,
            resource: self.resource,
            groups: self.groups,
            grants: self.acls,
        }
    }
}

/// Resolved configuration and profile for one invocation.
pub struct Session {
    pub config: DbSetupConfig,
    pub profile: ProfileConfig,
}

impl Session {
    /// Load configuration and resolve the selected profile. Nothing remote is
    /// contacted here, so a bad profile fails before any query.
    pub fn open(global: &GlobalArgs) -> anyhow::Result<Self> {
        let config = DbSetupConfig::discover(global.config.as_deref()).context("Failed to load configuration")?;
        let profile_file = config.profile_file_path()?;
        let store = ProfileStore::load(&profile_file)
            .with_context(|| format!("Failed to read profile file: {}", profile_file.display()))?;
        let profile = store.resolve(&global.profile)?;

        tracing::debug!(profile = %profile.name, host = %profile.host, "Resolved profile");
        Ok(Self { config, profile })
    }

    /// Execution context backed by the control-plane CLI and REST API.
    pub fn context(&self) -> ExecutionContext {
        let gateway = WorkspaceGateway::for_profile(&self.config.cli_binary, &self.profile, &self.config.api_version);
        ExecutionContext::new(self.profile.name.clone(), Arc::new(gateway))
    }
}

/// Log the outcome of an applied plan.
pub fn log_report(report: Option<&ApplyReport>) {
    let Some(report) = report else {
        tracing::info!("No changes applied");
        return;
    };
    for status in &report.statuses {
        tracing::info!(kind = %status.kind.as_str(), name = %status.name, status = %status.status, "Resource state");
    }
    tracing::info!(steps = report.executed.len(), "Plan applied");
}
