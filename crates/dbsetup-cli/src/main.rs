use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{cluster, scope};

#[derive(Parser, Debug)]
#[command(
    name = "dbsetup",
    version,
    about = "Reconcile workspace clusters, secret scopes and their access groups"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Control-plane CLI profile to run under.
    #[arg(long, global = true, env = "DBSETUP_PROFILE", default_value = "DEFAULT")]
    pub profile: String,

    /// Configuration file. Defaults to ./dbsetup.yaml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage a compute cluster and its access groups.
    Cluster {
        #[command(subcommand)]
        cmd: ClusterCommand,
    },

    /// Manage a key-vault backed secret scope and its access groups.
    Scope {
        #[command(subcommand)]
        cmd: ScopeCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ClusterCommand {
    /// Create or converge a cluster, its groups and its permissions.
    Update(cluster::UpdateArgs),

    /// Delete a cluster, its groups or its permissions.
    Delete(cluster::DeleteArgs),
}

#[derive(Subcommand, Debug)]
enum ScopeCommand {
    /// Create a secret scope and converge its groups and ACLs.
    Update(scope::UpdateArgs),

    /// Delete a secret scope, its groups or its ACLs.
    Delete(scope::DeleteArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Plan rendering goes to stdout; logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Cluster { cmd } => match cmd {
            ClusterCommand::Update(args) => cluster::update(&cli.global, args).await?,
            ClusterCommand::Delete(args) => cluster::delete(&cli.global, args).await?,
        },
        Command::Scope { cmd } => match cmd {
            ScopeCommand::Update(args) => scope::update(&cli.global, args).await?,
            ScopeCommand::Delete(args) => scope::delete(&cli.global, args).await?,
        },
    }

    Ok(())
}
