// ABOUTME: Integration tests for environment resolution and validation.
// ABOUTME: Derivation determinism, overrides, and compose-file service discovery.

mod support;

use briefex_ops::environment::{EnvironmentConfig, EnvironmentInputs, compose_file_name};
use briefex_ops::error::Error;
use proptest::prelude::*;
use std::path::{Path, PathBuf};
use support::Project;

fn inputs(env: &str) -> EnvironmentInputs {
    EnvironmentInputs {
        env: Some(env.to_string()),
        ..Default::default()
    }
}

#[test]
fn project_is_lower_cased() {
    let env = EnvironmentConfig::resolve(&inputs("QA"), Path::new("/srv")).unwrap();
    assert_eq!(env.project, "briefex-qa");
    assert_eq!(env.compose_file, PathBuf::from("/srv/docker-compose.QA.yml"));
}

#[test]
fn validate_lists_declared_services() {
    let project = Project::with_compose("dev", &["app", "worker", "db"]);
    let env = EnvironmentConfig::resolve(&inputs("dev"), project.path()).unwrap();

    let services: Vec<String> = env
        .validate()
        .unwrap()
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(services, ["app", "db", "worker"]);
}

#[test]
fn validate_reports_missing_file_with_remedy() {
    let project = Project::empty();
    let env = EnvironmentConfig::resolve(&inputs("staging"), project.path()).unwrap();

    let err = env.validate().unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(message.contains(&compose_file_name("staging")));
    assert!(message.contains("ENV=<name>"));
}

#[test]
fn compose_without_services_is_configuration_error() {
    let project = Project::empty();
    std::fs::write(project.path().join("docker-compose.dev.yml"), "volumes: {}\n").unwrap();
    let env = EnvironmentConfig::resolve(&inputs("dev"), project.path()).unwrap();

    assert!(matches!(env.validate(), Err(Error::Configuration(_))));
}

proptest! {
    #[test]
    fn resolution_is_deterministic(env in "[a-z][a-z0-9_-]{0,15}") {
        let a = EnvironmentConfig::resolve(&inputs(&env), Path::new("/srv")).unwrap();
        let b = EnvironmentConfig::resolve(&inputs(&env), Path::new("/srv")).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.project, format!("briefex-{env}"));
        prop_assert!(a.compose_file.ends_with(compose_file_name(&env)));
    }

    #[test]
    fn distinct_envs_never_share_namespace(
        a in "[a-z][a-z0-9]{0,8}",
        b in "[a-z][a-z0-9]{0,8}",
    ) {
        prop_assume!(a != b);
        let ea = EnvironmentConfig::resolve(&inputs(&a), Path::new("/srv")).unwrap();
        let eb = EnvironmentConfig::resolve(&inputs(&b), Path::new("/srv")).unwrap();
        prop_assert_ne!(ea.project, eb.project);
        prop_assert_ne!(ea.compose_file, eb.compose_file);
    }
}
