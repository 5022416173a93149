// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines global overrides and every lifecycle, migration, and release subcommand.

use briefex_ops::commands::{Operation, ReleaseStage, exec_operation};
use briefex_ops::error::Result;
use briefex_ops::lifecycle::LifecycleOp;
use briefex_ops::migration::Migration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "briefex-ops")]
#[command(about = "Compose, migration, and release orchestration for briefex environments")]
#[command(version)]
pub struct Cli {
    /// Deployment environment (shortcut for --set ENV=<name>)
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Override a setting, e.g. --set OWNER=acme (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE", global = true)]
    pub set: Vec<String>,

    /// Settings file (default: briefex-ops.yml in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build all service images
    Build,
    /// Start all services detached
    Up,
    /// Rebuild images and start all services detached
    UpBuild,
    /// Stop and remove containers and networks
    Down,
    /// Stop services without removing them
    Stop,
    /// Restart services
    Restart,
    /// Show service status
    Ps,
    /// Follow logs (all services, or one)
    Logs { service: Option<String> },
    /// Pull service images
    Pull,
    /// DANGER: stop everything and delete the project's volumes
    Destroy,
    /// Run a command inside a service
    ///
    /// The command words are joined with single spaces, like ssh does, and
    /// the result runs under `sh -c`. Quote the whole command to keep inner
    /// quoting intact: exec app "sh -c 'echo hi'"
    Exec {
        service: Option<String>,
        /// Command words, joined with spaces and run with `sh -c`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Open a shell in a service (bash when available, else sh)
    Sh { service: Option<String> },

    /// Autogenerate a new migration revision
    MigrationNew { message: Option<String> },
    /// Upgrade the schema to the latest revision
    MigrationUpgradeHead,
    /// Upgrade the schema to a revision
    MigrationUpgradeTo { revision: Option<String> },
    /// Downgrade the schema to a revision
    MigrationDowngradeTo { revision: Option<String> },
    /// Show migration history
    MigrationHistory,

    /// Log in to the container registry (prod only)
    ReleaseLogin,
    /// Build the release image with version and revision tags (prod only)
    ReleaseBuild,
    /// Push the release tags and apply the latest policy (prod only)
    ReleasePush,
    /// Login, build, and push (prod only)
    ReleasePublish,
    /// Show the published manifest and labels (prod only)
    ReleaseShow,
}

impl Commands {
    pub fn into_operation(self) -> Result<Operation> {
        let op = match self {
            Commands::Build => Operation::Lifecycle(LifecycleOp::Build),
            Commands::Up => Operation::Lifecycle(LifecycleOp::Up),
            Commands::UpBuild => Operation::Lifecycle(LifecycleOp::UpBuild),
            Commands::Down => Operation::Lifecycle(LifecycleOp::Down),
            Commands::Stop => Operation::Lifecycle(LifecycleOp::Stop),
            Commands::Restart => Operation::Lifecycle(LifecycleOp::Restart),
            Commands::Ps => Operation::Lifecycle(LifecycleOp::Ps),
            Commands::Logs { service: None } => Operation::Lifecycle(LifecycleOp::Logs),
            Commands::Logs {
                service: Some(service),
            } => Operation::ServiceLogs { service },
            Commands::Pull => Operation::Lifecycle(LifecycleOp::Pull),
            Commands::Destroy => Operation::Lifecycle(LifecycleOp::Destroy),
            Commands::Exec { service, command } => exec_operation(service, &command)?,
            Commands::Sh { service } => Operation::Shell { service },
            Commands::MigrationNew { message } => Operation::Migrate(Migration::New {
                message: message.unwrap_or_default(),
            }),
            Commands::MigrationUpgradeHead => Operation::Migrate(Migration::UpgradeHead),
            Commands::MigrationUpgradeTo { revision } => Operation::Migrate(Migration::UpgradeTo {
                revision: revision.unwrap_or_default(),
            }),
            Commands::MigrationDowngradeTo { revision } => {
                Operation::Migrate(Migration::DowngradeTo {
                    revision: revision.unwrap_or_default(),
                })
            }
            Commands::MigrationHistory => Operation::Migrate(Migration::History),
            Commands::ReleaseLogin => Operation::Release(ReleaseStage::Login),
            Commands::ReleaseBuild => Operation::Release(ReleaseStage::Build),
            Commands::ReleasePush => Operation::Release(ReleaseStage::Push),
            Commands::ReleasePublish => Operation::Release(ReleaseStage::Publish),
            Commands::ReleaseShow => Operation::Release(ReleaseStage::Show),
        };
        Ok(op)
    }
}
