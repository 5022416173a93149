// ABOUTME: Layered settings for briefex-ops.
// ABOUTME: Merges defaults, an optional YAML file, BRIEFEX_* variables, and CLI overrides.

mod credentials;
mod latest_policy;
mod overrides;

pub use credentials::{RegistryCredentials, TOKEN_VAR, USERNAME_VAR};
pub use latest_policy::LatestPolicy;
pub use overrides::{Assignment, KEYS};

use crate::error::{Error, Result};
use crate::migration::MigrationMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "briefex-ops.yml";
pub const CONFIG_FILENAME_DIR: &str = ".briefex-ops/config.yml";

/// Prefix for environment variables that override settings.
pub const ENV_PREFIX: &str = "BRIEFEX_";

/// One layer of settings. Unset fields fall through to lower layers and,
/// finally, to the defaults owned by each component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub env: Option<String>,
    pub compose_file: Option<PathBuf>,
    pub project: Option<String>,
    pub service: Option<String>,
    pub log_tail: Option<u32>,
    pub docker: Option<String>,

    pub alembic: Option<String>,
    pub migration_mode: Option<MigrationMode>,
    pub migration_service: Option<String>,

    pub dockerfile: Option<PathBuf>,
    pub platform: Option<String>,
    pub registry: Option<String>,
    pub image: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub version: Option<String>,
    pub push_latest: Option<LatestPolicy>,
    pub trunk_branch: Option<String>,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file is a valid, empty layer.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded settings file");
        Self::from_yaml(&content)
    }

    /// Find a settings file in `dir`. Absence is not an error.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_DIR)];

        for path in &candidates {
            if path.is_file() {
                return Self::load(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Build the variable layer from `BRIEFEX_<KEY>` pairs.
    ///
    /// Variables outside the known key set are ignored.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if KEYS.contains(&key) {
                layer
                    .set(key, &value)
                    .map_err(|e| Error::configuration(format!("{name}: {e}")))?;
            }
        }
        Ok(layer)
    }

    /// Resolve every layer for an invocation started in `dir`.
    ///
    /// Precedence, lowest first: file, environment variables, assignments.
    pub fn layered<I>(
        dir: &Path,
        explicit_file: Option<&Path>,
        vars: I,
        assignments: &[Assignment],
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let file = match explicit_file {
            Some(path) if !path.is_file() => return Err(Error::ConfigNotFound(path.into())),
            Some(path) => Self::load(path)?,
            None => Self::discover(dir)?.unwrap_or_default(),
        };

        let mut settings = file.merge(Self::from_vars(vars)?);
        for assignment in assignments {
            settings.set(&assignment.key, &assignment.value)?;
        }
        Ok(settings)
    }

    /// Overlay `upper` on top of `self`; set fields in `upper` win.
    pub fn merge(self, upper: Settings) -> Settings {
        Settings {
            env: upper.env.or(self.env),
            compose_file: upper.compose_file.or(self.compose_file),
            project: upper.project.or(self.project),
            service: upper.service.or(self.service),
            log_tail: upper.log_tail.or(self.log_tail),
            docker: upper.docker.or(self.docker),
            alembic: upper.alembic.or(self.alembic),
            migration_mode: upper.migration_mode.or(self.migration_mode),
            migration_service: upper.migration_service.or(self.migration_service),
            dockerfile: upper.dockerfile.or(self.dockerfile),
            platform: upper.platform.or(self.platform),
            registry: upper.registry.or(self.registry),
            image: upper.image.or(self.image),
            owner: upper.owner.or(self.owner),
            repo: upper.repo.or(self.repo),
            version: upper.version.or(self.version),
            push_latest: upper.push_latest.or(self.push_latest),
            trunk_branch: upper.trunk_branch.or(self.trunk_branch),
        }
    }

    /// Apply one `KEY=VALUE` override. Keys are case-insensitive.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let text = || Some(value.to_string());
        let key = key.trim().to_ascii_uppercase();
        match key.as_str() {
            "ENV" => self.env = text(),
            "COMPOSE_FILE" => self.compose_file = Some(PathBuf::from(value)),
            "PROJECT" => self.project = text(),
            "SERVICE" => self.service = text(),
            "LOG_TAIL" => {
                let tail = value
                    .trim()
                    .parse()
                    .map_err(|_| Error::usage(format!("LOG_TAIL must be a number, got {value:?}")))?;
                self.log_tail = Some(tail);
            }
            "DOCKER" => self.docker = text(),
            "ALEMBIC" => self.alembic = text(),
            "MIGRATION_MODE" => {
                self.migration_mode = Some(value.parse().map_err(Error::Usage)?);
            }
            "MIGRATION_SERVICE" => self.migration_service = text(),
            "DOCKERFILE" => self.dockerfile = Some(PathBuf::from(value)),
            "PLATFORM" => self.platform = text(),
            "REGISTRY" => self.registry = text(),
            "IMAGE" => self.image = text(),
            "OWNER" => self.owner = text(),
            "REPO" => self.repo = text(),
            "VERSION" => self.version = text(),
            "PUSH_LATEST" => self.push_latest = Some(value.parse().map_err(Error::Usage)?),
            "TRUNK_BRANCH" => self.trunk_branch = text(),
            other => {
                return Err(Error::usage(format!(
                    "unknown setting {other:?}; known settings: {}",
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
