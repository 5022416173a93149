// ABOUTME: Integration tests for layered settings resolution.
// ABOUTME: File, BRIEFEX_* variables, and --set overrides, plus registry credentials from env.

mod support;

use briefex_ops::config::{
    Assignment, CONFIG_FILENAME, CONFIG_FILENAME_DIR, LatestPolicy, RegistryCredentials, Settings,
};
use briefex_ops::error::Error;
use briefex_ops::migration::MigrationMode;
use support::Project;

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn no_file_no_vars_is_empty() {
    let project = Project::empty();
    let settings = Settings::layered(project.path(), None, vars(&[]), &[]).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_is_discovered_in_working_directory() {
    let project = Project::empty();
    std::fs::write(
        project.path().join(CONFIG_FILENAME),
        "env: staging\nowner: acme\nlog_tail: 50\npush_latest: false\nmigration_mode: service\n",
    )
    .unwrap();

    let settings = Settings::layered(project.path(), None, vars(&[]), &[]).unwrap();

    assert_eq!(settings.env.as_deref(), Some("staging"));
    assert_eq!(settings.owner.as_deref(), Some("acme"));
    assert_eq!(settings.log_tail, Some(50));
    assert_eq!(settings.push_latest, Some(LatestPolicy::Never));
    assert_eq!(settings.migration_mode, Some(MigrationMode::Service));
}

#[test]
fn dot_directory_file_is_discovered() {
    let project = Project::empty();
    let path = project.path().join(CONFIG_FILENAME_DIR);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "repo: briefex\n").unwrap();

    let settings = Settings::discover(project.path()).unwrap().unwrap();
    assert_eq!(settings.repo.as_deref(), Some("briefex"));
}

#[test]
fn variables_override_file_and_assignments_override_both() {
    let project = Project::empty();
    std::fs::write(
        project.path().join(CONFIG_FILENAME),
        "env: staging\nowner: from-file\nrepo: from-file\n",
    )
    .unwrap();

    let settings = Settings::layered(
        project.path(),
        None,
        vars(&[("BRIEFEX_OWNER", "from-env"), ("BRIEFEX_ENV", "qa")]),
        &[Assignment::new("ENV", "prod")],
    )
    .unwrap();

    assert_eq!(settings.env.as_deref(), Some("prod"));
    assert_eq!(settings.owner.as_deref(), Some("from-env"));
    assert_eq!(settings.repo.as_deref(), Some("from-file"));
}

#[test]
fn unknown_file_key_is_rejected() {
    let project = Project::empty();
    std::fs::write(project.path().join(CONFIG_FILENAME), "colour: blue\n").unwrap();

    let err = Settings::layered(project.path(), None, vars(&[]), &[]).unwrap_err();
    assert!(matches!(err, Error::Yaml(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn bad_variable_value_names_the_variable() {
    let project = Project::empty();
    let err = Settings::layered(
        project.path(),
        None,
        vars(&[("BRIEFEX_PUSH_LATEST", "sometimes")]),
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.to_string().contains("BRIEFEX_PUSH_LATEST"));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let project = Project::empty();
    let missing = project.path().join("nope.yml");

    let err = Settings::layered(project.path(), Some(&missing), vars(&[]), &[]).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound(_)));
}

#[test]
fn explicit_file_skips_discovery() {
    let project = Project::empty();
    std::fs::write(project.path().join(CONFIG_FILENAME), "env: staging\n").unwrap();
    let other = project.path().join("other.yml");
    std::fs::write(&other, "version: v2.0.0\n").unwrap();

    let settings = Settings::layered(project.path(), Some(&other), vars(&[]), &[]).unwrap();
    assert_eq!(settings.env, None);
    assert_eq!(settings.version.as_deref(), Some("v2.0.0"));
}

#[test]
fn assignments_parse_key_case_insensitively() {
    let parsed = Assignment::parse_all(&["owner=acme", "COMPOSE_FILE=deploy/compose.yml"]).unwrap();
    let mut settings = Settings::default();
    for a in &parsed {
        settings.set(&a.key, &a.value).unwrap();
    }
    assert_eq!(settings.owner.as_deref(), Some("acme"));
    assert_eq!(
        settings.compose_file.as_deref(),
        Some(std::path::Path::new("deploy/compose.yml"))
    );
}

#[test]
fn assignment_without_equals_is_usage_error() {
    let err = Assignment::parse_all(&["OWNER"]).unwrap_err();
    assert!(matches!(err, Error::Usage(_)));
}

#[test]
fn credentials_come_from_process_environment() {
    temp_env::with_vars(
        [
            ("GHCR_USERNAME", Some("bot")),
            ("GHCR_TOKEN", Some("ghp_secret")),
        ],
        || {
            let creds = RegistryCredentials::from_env();
            assert_eq!(creds.username_or("acme"), "bot");
            assert_eq!(creds.require_token().unwrap().expose(), "ghp_secret");
            assert!(!format!("{creds:?}").contains("ghp_secret"));
        },
    );
}

#[test]
fn missing_token_is_usage_error() {
    temp_env::with_vars(
        [("GHCR_USERNAME", None::<&str>), ("GHCR_TOKEN", None)],
        || {
            let creds = RegistryCredentials::from_env();
            assert_eq!(creds.username_or("acme"), "acme");
            let err = creds.require_token().unwrap_err();
            assert!(matches!(err, Error::Usage(_)));
            assert!(err.to_string().contains("GHCR_TOKEN"));
        },
    );
}
