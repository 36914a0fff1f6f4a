//! Cluster commands.
//!
//! `dbsetup cluster update` - Create or converge a cluster and its access groups.
//! `dbsetup cluster delete` - Delete a cluster, its groups or its permissions.

use super::{DeleteFlags, Session, log_report};
use crate::GlobalArgs;
use dbsetup_core::{ResourceKind, ResourceName};
use dbsetup_engine::{ClusterUpdate, plan_cluster_update, plan_delete, run_plan};

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Cluster name. Matched case-insensitively.
    #[arg(long)]
    pub name: String,

    /// Leave a newly created cluster running instead of terminating it.
    #[arg(short = 'r', long = "keep-running")]
    pub keep_running: bool,

    /// Print the plan without applying it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Cluster name. Matched case-insensitively.
    #[arg(long)]
    pub name: String,

    #[command(flatten)]
    pub flags: DeleteFlags,
}

pub async fn update(global: &GlobalArgs, args: UpdateArgs) -> anyhow::Result<()> {
    let request = ClusterUpdate {
        name: ResourceName::new(ResourceKind::Cluster, &args.name)?,
        keep_running: args.keep_running,
    };
    let session = Session::open(global)?;
    let ctx = session.context();

    let plan = plan_cluster_update(ctx.gateway(), &session.config.cluster, &request).await?;
    // Updates never prompt; --dry-run is the only way to stop short of applying.
    let report = run_plan(&ctx, &plan, args.dry_run, true).await?;
    log_report(report.as_ref());
    Ok(())
}

pub async fn delete(global: &GlobalArgs, args: DeleteArgs) -> anyhow::Result<()> {
    let name = ResourceName::new(ResourceKind::Cluster, &args.name)?;
    let session = Session::open(global)?;
    let ctx = session.context();

    let plan = plan_delete(ctx.gateway(), &name, args.flags.selection()).await?;
    let report = run_plan(&ctx, &plan, args.flags.debug, args.flags.quiet).await?;
    log_report(report.as_ref());
    Ok(())
}
