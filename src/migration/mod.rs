// ABOUTME: Alembic migration controller with local and in-service execution modes.
// ABOUTME: Parameters are validated before the mode is consulted, so both behave alike.

use crate::config::Settings;
use crate::dispatch::{CommandInvocation, Dispatcher};
use crate::error::{Error, Result};
use crate::lifecycle::ServiceController;
use serde::de::{self, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ALEMBIC: &str = "alembic";

/// Where migration commands run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationMode {
    /// Against a locally installed toolchain.
    #[default]
    Local,
    /// Inside a running compose service, through `docker compose exec`.
    Service,
}

impl FromStr for MigrationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(MigrationMode::Local),
            "service" | "container" | "docker" => Ok(MigrationMode::Service),
            other => Err(format!(
                "unknown migration mode: {other:?} (expected local or service)"
            )),
        }
    }
}

impl fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationMode::Local => write!(f, "local"),
            MigrationMode::Service => write!(f, "service"),
        }
    }
}

impl<'de> Deserialize<'de> for MigrationMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A migration operation and its parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Migration {
    New { message: String },
    UpgradeHead,
    UpgradeTo { revision: String },
    DowngradeTo { revision: String },
    History,
}

impl Migration {
    /// Alembic arguments for this operation, or a usage error when its
    /// required parameter is blank.
    pub fn alembic_args(&self) -> Result<Vec<String>> {
        let args = match self {
            Migration::New { message } => {
                let message = required(message, "migration-new <MESSAGE>")?;
                vec!["revision", "--autogenerate", "-m", message]
            }
            Migration::UpgradeHead => vec!["upgrade", "head"],
            Migration::UpgradeTo { revision } => {
                vec!["upgrade", required(revision, "migration-upgrade-to <REVISION>")?]
            }
            Migration::DowngradeTo { revision } => vec![
                "downgrade",
                required(revision, "migration-downgrade-to <REVISION>")?,
            ],
            Migration::History => vec!["history", "--verbose"],
        };
        Ok(args.into_iter().map(String::from).collect())
    }
}

fn required<'a>(value: &'a str, usage: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        let param = usage
            .split_once('<')
            .map(|(_, rest)| rest.trim_end_matches('>'))
            .unwrap_or("parameter");
        return Err(Error::usage(format!("missing {param}: {usage}")));
    }
    Ok(value)
}

/// Runs migrations in the configured mode.
pub struct MigrationController<'a> {
    mode: MigrationMode,
    toolchain: Vec<String>,
    dispatcher: &'a dyn Dispatcher,
    services: &'a ServiceController<'a>,
    target_service: String,
}

impl<'a> MigrationController<'a> {
    pub fn new(
        settings: &Settings,
        dispatcher: &'a dyn Dispatcher,
        services: &'a ServiceController<'a>,
    ) -> Self {
        let toolchain: Vec<String> = settings
            .alembic
            .as_deref()
            .unwrap_or(DEFAULT_ALEMBIC)
            .split_whitespace()
            .map(String::from)
            .collect();
        let target_service = settings
            .migration_service
            .clone()
            .unwrap_or_else(|| services.environment().default_service.to_string());

        Self {
            mode: settings.migration_mode.unwrap_or_default(),
            toolchain,
            dispatcher,
            services,
            target_service,
        }
    }

    pub async fn run(&self, migration: &Migration) -> Result<()> {
        let args = migration.alembic_args()?;
        let Some((program, prefix)) = self.toolchain.split_first() else {
            return Err(Error::configuration("ALEMBIC is empty"));
        };

        tracing::info!(mode = %self.mode, ?migration, "running migration");
        match self.mode {
            MigrationMode::Local => {
                let invocation = CommandInvocation::new(program)
                    .args(prefix.iter().cloned())
                    .args(args);
                self.dispatcher.run(&invocation).await?;
                Ok(())
            }
            MigrationMode::Service => {
                let argv: Vec<String> = self.toolchain.iter().cloned().chain(args).collect();
                self.services.exec_args(&self.target_service, &argv).await
            }
        }
    }
}
