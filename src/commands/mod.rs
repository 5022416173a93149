// ABOUTME: Operation catalogue and dispatch from CLI commands to controllers.
// ABOUTME: Builds controllers over one resolved environment and runs a single operation.

use crate::config::{RegistryCredentials, Settings};
use crate::dispatch::Dispatcher;
use crate::environment::EnvironmentConfig;
use crate::error::{Error, Result};
use crate::lifecycle::{LifecycleOp, ServiceController};
use crate::migration::{Migration, MigrationController};
use crate::output::Output;
use crate::release::{Publisher, ReleaseSettings};

/// The guarded release stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStage {
    Login,
    Build,
    Push,
    Publish,
    Show,
}

/// Every operation the orchestrator exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Lifecycle(LifecycleOp),
    ServiceLogs { service: String },
    Shell { service: Option<String> },
    Exec { service: String, command: String },
    Migrate(Migration),
    Release(ReleaseStage),
}

impl Operation {
    /// The command name as typed on the command line.
    pub fn name(&self) -> String {
        match self {
            Operation::Lifecycle(op) => op.to_string(),
            Operation::ServiceLogs { service } => format!("logs {service}"),
            Operation::Shell { .. } => "sh".to_string(),
            Operation::Exec { .. } => "exec".to_string(),
            Operation::Migrate(m) => match m {
                Migration::New { .. } => "migration-new",
                Migration::UpgradeHead => "migration-upgrade-head",
                Migration::UpgradeTo { .. } => "migration-upgrade-to",
                Migration::DowngradeTo { .. } => "migration-downgrade-to",
                Migration::History => "migration-history",
            }
            .to_string(),
            Operation::Release(stage) => match stage {
                ReleaseStage::Login => "release-login",
                ReleaseStage::Build => "release-build",
                ReleaseStage::Push => "release-push",
                ReleaseStage::Publish => "release-publish",
                ReleaseStage::Show => "release-show",
            }
            .to_string(),
        }
    }
}

/// Everything resolved once per invocation.
pub struct Context<'a> {
    pub settings: Settings,
    pub env: EnvironmentConfig,
    pub credentials: RegistryCredentials,
    pub dispatcher: &'a dyn Dispatcher,
    pub output: &'a Output,
}

pub async fn execute(operation: &Operation, ctx: &Context<'_>) -> Result<()> {
    tracing::debug!(
        operation = %operation.name(),
        env = %ctx.env.env,
        project = %ctx.env.project,
        "executing"
    );
    let services = ServiceController::from_settings(&ctx.env, ctx.dispatcher, &ctx.settings);

    match operation {
        Operation::Lifecycle(op) => services.run(*op).await,
        Operation::ServiceLogs { service } => services.logs(service).await,
        Operation::Shell { service } => services.shell(service.as_deref()).await,
        Operation::Exec { service, command } => services.exec(service, command).await,
        Operation::Migrate(migration) => {
            MigrationController::new(&ctx.settings, ctx.dispatcher, &services)
                .run(migration)
                .await
        }
        Operation::Release(stage) => release(*stage, ctx).await,
    }
}

async fn release(stage: ReleaseStage, ctx: &Context<'_>) -> Result<()> {
    let publisher = Publisher::new(
        &ctx.env,
        ReleaseSettings::from(&ctx.settings),
        ctx.credentials.clone(),
        ctx.dispatcher,
        ctx.output,
    );

    match stage {
        ReleaseStage::Login => publisher.login().await,
        ReleaseStage::Build => publisher.build().await.map(|d| {
            ctx.output.progress(&format!(
                "  ✓ Built {} ({})",
                d.version_ref(),
                d.revision_ref()
            ));
        }),
        ReleaseStage::Push => publisher.push().await.map(|_| ()),
        ReleaseStage::Publish => publisher.publish().await.map(|d| {
            ctx.output
                .progress(&format!("  ✓ Published {}", d.version_ref()));
        }),
        ReleaseStage::Show => {
            let diag = publisher.show().await?;
            for warning in diag.warnings() {
                ctx.output.warning(&warning.message);
            }
            Ok(())
        }
    }
}

/// Join the words of an exec command back into one shell string.
///
/// Words are joined with single spaces and not re-quoted, so a command given
/// as one quoted argument reaches `sh -c` unchanged.
pub fn exec_operation(service: Option<String>, command: &[String]) -> Result<Operation> {
    let service = service.unwrap_or_default();
    let command = command.join(" ");
    if service.trim().is_empty() || command.trim().is_empty() {
        return Err(Error::usage(
            "exec needs a service and a command: exec <SERVICE> <COMMAND...>",
        ));
    }
    Ok(Operation::Exec { service, command })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_command_line() {
        assert_eq!(Operation::Lifecycle(LifecycleOp::UpBuild).name(), "up-build");
        assert_eq!(
            Operation::Migrate(Migration::UpgradeHead).name(),
            "migration-upgrade-head"
        );
        assert_eq!(
            Operation::Release(ReleaseStage::Publish).name(),
            "release-publish"
        );
    }

    #[test]
    fn exec_operation_requires_both_parts() {
        assert!(matches!(
            exec_operation(None, &["ls".into()]),
            Err(Error::Usage(_))
        ));
        assert!(matches!(
            exec_operation(Some("app".into()), &[]),
            Err(Error::Usage(_))
        ));
        assert_eq!(
            exec_operation(Some("app".into()), &["echo 'a  b' | wc -c".into()]).unwrap(),
            Operation::Exec {
                service: "app".into(),
                command: "echo 'a  b' | wc -c".into()
            }
        );
        assert_eq!(
            exec_operation(Some("app".into()), &["ls".into(), "-la".into()]).unwrap(),
            Operation::Exec {
                service: "app".into(),
                command: "ls -la".into()
            }
        );
    }
}
