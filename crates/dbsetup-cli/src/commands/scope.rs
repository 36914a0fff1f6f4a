//! Secret scope commands.
//!
//! `dbsetup scope update` - Create a key-vault backed scope and converge its ACLs.
//! `dbsetup scope delete` - Delete a scope, its groups or its ACLs.
//!
//! Creating a scope runs under the elevated profile, so `update` refreshes
//! that profile from the identity provider's token artifact first.

use super::{DeleteFlags, Session, log_report};
use crate::GlobalArgs;
use anyhow::Context;
use dbsetup_core::{ResourceKind, ResourceName};
use dbsetup_credential::TokenRefresher;
use dbsetup_engine::{ScopeUpdate, plan_delete, plan_scope_update, run_plan};
use std::sync::Arc;

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Name of the backing key vault.
    #[arg(long)]
    pub key_vault: String,

    /// Full resource id of the backing key vault.
    #[arg(long)]
    pub resource_id: String,

    /// Scope name. Defaults to the key vault name.
    #[arg(long)]
    pub scope_name: Option<String>,

    /// Delete and recreate the scope if it already exists.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Print the plan without applying it.
    #[arg(long)]
    pub dry_run: bool,
}

impl UpdateArgs {
    pub fn scope_name(&self) -> &str {
        self.scope_name.as_deref().unwrap_or(&self.key_vault)
    }
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Scope name.
    #[arg(long)]
    pub scope_name: String,

    #[command(flatten)]
    pub flags: DeleteFlags,
}

pub async fn update(global: &GlobalArgs, args: UpdateArgs) -> anyhow::Result<()> {
    let request = ScopeUpdate {
        name: ResourceName::new(ResourceKind::Scope, args.scope_name())?,
        key_vault: args.key_vault.clone(),
        resource_id: args.resource_id.clone(),
        force: args.force,
    };
    let session = Session::open(global)?;

    let refresher = TokenRefresher::new(
        session
            .config
            .token_artifact_path()
            .context("Failed to locate the token artifact")?,
        session.config.profile_file_path()?,
        session.profile.name.clone(),
        session.config.elevated_profile.clone(),
    );
    let ctx = session.context().with_credentials(Arc::new(refresher));

    let plan = plan_scope_update(ctx.gateway(), &request).await?;
    let report = run_plan(&ctx, &plan, args.dry_run, true).await?;
    log_report(report.as_ref());
    Ok(())
}

pub async fn delete(global: &GlobalArgs, args: DeleteArgs) -> anyhow::Result<()> {
    let name = ResourceName::new(ResourceKind::Scope, &args.scope_name)?;
    let session = Session::open(global)?;
    let ctx = session.context();

    let plan = plan_delete(ctx.gateway(), &name, args.flags.selection()).await?;
    let report = run_plan(&ctx, &plan, args.flags.debug, args.flags.quiet).await?;
    log_report(report.as_ref());
    Ok(())
}
