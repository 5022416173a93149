// ABOUTME: Service lifecycle controller driving `docker compose` for one environment.
// ABOUTME: Fixed operations, per-service logs and shell, and arbitrary exec.

use crate::config::Settings;
use crate::dispatch::{CommandInvocation, Dispatcher};
use crate::environment::EnvironmentConfig;
use crate::error::{Error, Result};
use crate::types::ServiceName;
use std::fmt;

pub const DEFAULT_DOCKER: &str = "docker";
pub const DEFAULT_LOG_TAIL: u32 = 200;

/// Prefer bash when the image has it, otherwise fall back to sh.
pub const SHELL_FALLBACK: &str =
    "if command -v bash >/dev/null 2>&1; then exec bash; else exec sh; fi";

/// The fixed catalogue of whole-project operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Build,
    Up,
    UpBuild,
    Down,
    Stop,
    Restart,
    Ps,
    Logs,
    Pull,
    /// Stops the project and irreversibly deletes its named volumes.
    Destroy,
}

impl LifecycleOp {
    fn compose_args(self, log_tail: u32) -> Vec<String> {
        let words: &[&str] = match self {
            LifecycleOp::Build => &["build"],
            LifecycleOp::Up => &["up", "-d"],
            LifecycleOp::UpBuild => &["up", "-d", "--build"],
            LifecycleOp::Down => &["down"],
            LifecycleOp::Stop => &["stop"],
            LifecycleOp::Restart => &["restart"],
            LifecycleOp::Ps => &["ps"],
            LifecycleOp::Logs => return logs_args(log_tail),
            LifecycleOp::Pull => &["pull"],
            LifecycleOp::Destroy => &["down", "-v", "--remove-orphans"],
        };
        words.iter().map(|w| w.to_string()).collect()
    }
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleOp::Build => "build",
            LifecycleOp::Up => "up",
            LifecycleOp::UpBuild => "up-build",
            LifecycleOp::Down => "down",
            LifecycleOp::Stop => "stop",
            LifecycleOp::Restart => "restart",
            LifecycleOp::Ps => "ps",
            LifecycleOp::Logs => "logs",
            LifecycleOp::Pull => "pull",
            LifecycleOp::Destroy => "destroy",
        };
        f.write_str(name)
    }
}

fn logs_args(log_tail: u32) -> Vec<String> {
    vec!["logs".into(), "-f".into(), format!("--tail={log_tail}")]
}

/// Runs compose operations against a resolved environment.
pub struct ServiceController<'a> {
    env: &'a EnvironmentConfig,
    dispatcher: &'a dyn Dispatcher,
    docker: String,
    log_tail: u32,
}

impl<'a> ServiceController<'a> {
    pub fn new(env: &'a EnvironmentConfig, dispatcher: &'a dyn Dispatcher) -> Self {
        Self {
            env,
            dispatcher,
            docker: DEFAULT_DOCKER.to_string(),
            log_tail: DEFAULT_LOG_TAIL,
        }
    }

    pub fn from_settings(
        env: &'a EnvironmentConfig,
        dispatcher: &'a dyn Dispatcher,
        settings: &Settings,
    ) -> Self {
        Self {
            docker: settings
                .docker
                .clone()
                .unwrap_or_else(|| DEFAULT_DOCKER.to_string()),
            log_tail: settings.log_tail.unwrap_or(DEFAULT_LOG_TAIL),
            ..Self::new(env, dispatcher)
        }
    }

    pub fn environment(&self) -> &EnvironmentConfig {
        self.env
    }

    fn compose(&self) -> CommandInvocation {
        CommandInvocation::new(&self.docker)
            .arg("compose")
            .arg("-f")
            .arg(self.env.compose_file.display().to_string())
            .arg("-p")
            .arg(&self.env.project)
    }

    pub async fn run(&self, op: LifecycleOp) -> Result<()> {
        self.env.validate()?;

        if op == LifecycleOp::Destroy {
            tracing::warn!(
                project = %self.env.project,
                "destroy removes all containers and volumes of the project; data is not recoverable"
            );
        }

        let invocation = self.compose().args(op.compose_args(self.log_tail));
        self.dispatcher.run(&invocation).await?;
        Ok(())
    }

    /// Follow the logs of a single service.
    pub async fn logs(&self, service: &str) -> Result<()> {
        let service = self.known_service(service, "logs <SERVICE>")?;
        let invocation = self
            .compose()
            .args(logs_args(self.log_tail))
            .arg(service.as_str());
        self.dispatcher.run(&invocation).await?;
        Ok(())
    }

    /// Open an interactive shell in `service` (default service when `None`).
    pub async fn shell(&self, service: Option<&str>) -> Result<()> {
        let service = match service {
            Some(name) => self.known_service(name, "sh [SERVICE]")?,
            None => {
                let service = self.env.default_service.clone();
                self.env.require_service(&service)?;
                service
            }
        };
        let invocation = self
            .compose()
            .args(["exec", service.as_str(), "sh", "-c", SHELL_FALLBACK]);
        self.dispatcher.run(&invocation).await?;
        Ok(())
    }

    /// Run a shell command string inside `service`.
    pub async fn exec(&self, service: &str, command: &str) -> Result<()> {
        if service.trim().is_empty() || command.trim().is_empty() {
            return Err(Error::usage(
                "exec needs a service and a command: exec <SERVICE> <COMMAND...>",
            ));
        }
        self.exec_args(service, &["sh".into(), "-c".into(), command.into()])
            .await
    }

    /// Run an argument vector inside `service` without an intermediate shell.
    pub async fn exec_args(&self, service: &str, argv: &[String]) -> Result<()> {
        if argv.is_empty() {
            return Err(Error::usage("exec needs a command to run"));
        }
        let service = ServiceName::new(service).map_err(|e| Error::usage(e.to_string()))?;
        self.env.validate()?;

        let invocation = self
            .compose()
            .args(["exec", service.as_str()])
            .args(argv.iter().cloned());
        self.dispatcher.run(&invocation).await?;
        Ok(())
    }

    fn known_service(&self, name: &str, usage: &str) -> Result<ServiceName> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::usage(format!("missing service name: {usage}")));
        }
        let service = ServiceName::new(name).map_err(|e| Error::usage(e.to_string()))?;
        self.env.require_service(&service)?;
        Ok(service)
    }
}
