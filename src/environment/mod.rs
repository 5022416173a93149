// ABOUTME: Environment resolution: env name to compose file, project, and default service.
// ABOUTME: Derivation is pure; validate() re-checks the compose file before each operation.

mod compose;

pub use compose::declared_services;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::types::ServiceName;
use nonempty::NonEmpty;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENV: &str = "dev";
pub const PROJECT_PREFIX: &str = "briefex-";
pub const DEFAULT_SERVICE: &str = "app";

/// Compose file name for an environment: `docker-compose.<env>.yml`.
pub fn compose_file_name(env: &str) -> String {
    format!("docker-compose.{env}.yml")
}

/// Project namespace for an environment: `briefex-<env>`, lower-cased.
pub fn project_name(env: &str) -> String {
    format!("{PROJECT_PREFIX}{env}").to_ascii_lowercase()
}

/// Overridable inputs to environment resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentInputs {
    pub env: Option<String>,
    pub compose_file: Option<PathBuf>,
    pub project: Option<String>,
    pub service: Option<String>,
}

impl From<&Settings> for EnvironmentInputs {
    fn from(settings: &Settings) -> Self {
        Self {
            env: settings.env.clone(),
            compose_file: settings.compose_file.clone(),
            project: settings.project.clone(),
            service: settings.service.clone(),
        }
    }
}

/// The effective environment for one invocation. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub env: String,
    pub project: String,
    pub compose_file: PathBuf,
    pub default_service: ServiceName,
}

impl EnvironmentConfig {
    /// Derive the environment from `inputs`, anchoring relative compose paths
    /// at `base_dir`. Touches no files.
    pub fn resolve(inputs: &EnvironmentInputs, base_dir: &Path) -> Result<Self> {
        let env = inputs.env.as_deref().unwrap_or(DEFAULT_ENV).trim();
        validate_env_name(env)?;

        let compose_file = base_dir.join(
            inputs
                .compose_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(compose_file_name(env))),
        );

        let project = match inputs.project.as_deref().map(str::trim) {
            Some(project) => {
                validate_project_name(project)?;
                project.to_string()
            }
            None => project_name(env),
        };

        let service = inputs.service.as_deref().unwrap_or(DEFAULT_SERVICE);
        let default_service = ServiceName::new(service)
            .map_err(|e| Error::configuration(format!("SERVICE={service:?}: {e}")))?;

        Ok(Self {
            env: env.to_string(),
            project,
            compose_file,
            default_service,
        })
    }

    /// Confirm the compose file exists and return the services it declares.
    ///
    /// Cheap and idempotent; every dependent operation calls it first.
    pub fn validate(&self) -> Result<NonEmpty<ServiceName>> {
        if !self.compose_file.is_file() {
            return Err(Error::configuration(format!(
                "compose file {} not found for environment '{}'; create it, or pick another \
                 environment with ENV=<name> or another file with COMPOSE_FILE=<path>",
                self.compose_file.display(),
                self.env
            )));
        }
        let yaml = std::fs::read_to_string(&self.compose_file)?;
        declared_services(&yaml, &self.compose_file)
    }

    /// Validate and check that `service` is declared by the compose file.
    pub fn require_service(&self, service: &ServiceName) -> Result<()> {
        let services = self.validate()?;
        if services.iter().any(|s| s == service) {
            return Ok(());
        }
        let known: Vec<&str> = services.iter().map(ServiceName::as_str).collect();
        Err(Error::usage(format!(
            "unknown service '{service}' in {}; known services: {}",
            self.compose_file.display(),
            known.join(", ")
        )))
    }
}

fn validate_env_name(env: &str) -> Result<()> {
    if env.is_empty() {
        return Err(Error::configuration(
            "environment name is empty; set ENV=<name> (e.g. ENV=dev)",
        ));
    }
    if let Some(c) = env
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(Error::configuration(format!(
            "invalid character {c:?} in environment name {env:?}"
        )));
    }
    Ok(())
}

fn validate_project_name(project: &str) -> Result<()> {
    let valid = project
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && project
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "invalid project name {project:?}: use lowercase letters, digits, '-' and '_'"
        )))
    }
}
