// ABOUTME: Test support utilities.
// ABOUTME: Temporary project directories with compose files and context builders.

use briefex_ops::commands::Context;
use briefex_ops::config::{RegistryCredentials, Settings};
use briefex_ops::dispatch::Dispatcher;
use briefex_ops::environment::{EnvironmentConfig, EnvironmentInputs};
use briefex_ops::output::{Output, OutputMode};
use briefex_ops::types::Secret;
use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("briefex_ops=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A project directory holding `docker-compose.<env>.yml` files.
pub struct Project {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// A project with a compose file for `env` declaring `services`.
    pub fn with_compose(env: &str, services: &[&str]) -> Self {
        let project = Self::empty();
        project.write_compose(env, services);
        project
    }

    pub fn write_compose(&self, env: &str, services: &[&str]) {
        let mut yaml = String::from("services:\n");
        for service in services {
            yaml.push_str(&format!("  {service}:\n    image: briefex:dev\n"));
        }
        std::fs::write(self.path().join(format!("docker-compose.{env}.yml")), yaml).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn compose_path(&self, env: &str) -> String {
        self.path()
            .join(format!("docker-compose.{env}.yml"))
            .display()
            .to_string()
    }

    pub fn environment(&self, settings: &Settings) -> EnvironmentConfig {
        EnvironmentConfig::resolve(&EnvironmentInputs::from(settings), self.path()).unwrap()
    }

    pub fn context<'a>(
        &self,
        settings: Settings,
        dispatcher: &'a dyn Dispatcher,
        output: &'a Output,
    ) -> Context<'a> {
        Context {
            env: self.environment(&settings),
            settings,
            credentials: RegistryCredentials::new(None, Some(Secret::new("ghp_test_token"))),
            dispatcher,
            output,
        }
    }
}

/// Settings built from `KEY=VALUE` pairs.
#[allow(dead_code)]
pub fn settings(pairs: &[(&str, &str)]) -> Settings {
    let mut settings = Settings::default();
    for (key, value) in pairs {
        settings.set(key, value).unwrap();
    }
    settings
}

#[allow(dead_code)]
pub fn quiet() -> Output {
    Output::new(OutputMode::Quiet)
}
