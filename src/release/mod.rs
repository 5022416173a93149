// ABOUTME: Release publisher: guarded registry login, image build, push, and inspection.
// ABOUTME: Computes version and revision tags and applies the latest-tag policy.

mod git;

pub use git::{GIT, current_branch, resolve_revision};

use crate::config::{LatestPolicy, RegistryCredentials, Settings};
use crate::diagnostics::{Diagnostics, Warning};
use crate::dispatch::{CommandInvocation, DispatchErrorKind, Dispatcher};
use crate::environment::EnvironmentConfig;
use crate::error::{Error, Result};
use crate::guard::{self, Identity, OWNER_PLACEHOLDER, REPO_PLACEHOLDER};
use crate::lifecycle::DEFAULT_DOCKER;
use crate::output::Output;
use crate::types::{ImageRef, Revision, validate_tag};
use std::path::PathBuf;

pub const DEFAULT_REGISTRY: &str = "ghcr.io";
pub const DEFAULT_VERSION: &str = "0.1.0";
pub const DEFAULT_TRUNK_BRANCH: &str = "main";
pub const DEFAULT_PLATFORM: &str = "linux/amd64";
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";
pub const LATEST_TAG: &str = "latest";

/// Release parameters after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    pub docker: String,
    pub registry: String,
    pub image: Option<String>,
    pub owner: String,
    pub repo: String,
    pub version: String,
    pub latest_policy: LatestPolicy,
    pub trunk_branch: String,
    pub platform: String,
    pub dockerfile: PathBuf,
    pub context: PathBuf,
}

impl From<&Settings> for ReleaseSettings {
    fn from(s: &Settings) -> Self {
        let or = |v: &Option<String>, default: &str| {
            v.clone().unwrap_or_else(|| default.to_string())
        };
        Self {
            docker: or(&s.docker, DEFAULT_DOCKER),
            registry: or(&s.registry, DEFAULT_REGISTRY),
            image: s.image.clone(),
            owner: or(&s.owner, OWNER_PLACEHOLDER),
            repo: or(&s.repo, REPO_PLACEHOLDER),
            version: or(&s.version, DEFAULT_VERSION),
            latest_policy: s.push_latest.unwrap_or_default(),
            trunk_branch: or(&s.trunk_branch, DEFAULT_TRUNK_BRANCH),
            platform: or(&s.platform, DEFAULT_PLATFORM),
            dockerfile: s
                .dockerfile
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKERFILE)),
            context: PathBuf::from("."),
        }
    }
}

impl ReleaseSettings {
    fn identity(&self) -> Identity<'_> {
        Identity {
            owner: Some(self.owner.as_str()),
            repo: Some(self.repo.as_str()),
        }
    }

    /// `IMAGE` when given, otherwise `<registry>/<owner>/<repo>`.
    pub fn image_ref(&self) -> Result<ImageRef> {
        let parsed = match &self.image {
            Some(image) => ImageRef::parse(image),
            None => ImageRef::for_repository(&self.registry, &self.owner, &self.repo),
        };
        parsed.map_err(|e| Error::usage(format!("invalid image reference: {e}")))
    }

    /// `VERSION` checked as an image tag.
    pub fn version_tag(&self) -> Result<String> {
        let tag = self.version.trim();
        validate_tag(tag).map_err(|e| {
            Error::usage(format!("VERSION must be a valid image tag (e.g. v1.2.3): {e}"))
        })?;
        Ok(tag.to_string())
    }

    fn login_registry(&self, image: &ImageRef) -> String {
        image
            .registry()
            .map(str::to_string)
            .unwrap_or_else(|| self.registry.clone())
    }
}

/// Everything one publish needs to tag and label the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub image: ImageRef,
    pub version_tag: String,
    pub revision: Revision,
    pub latest_policy: LatestPolicy,
}

impl ReleaseDescriptor {
    pub fn new(settings: &ReleaseSettings, revision: Revision) -> Result<Self> {
        let image = settings.image_ref()?;
        let version_tag = settings.version_tag()?;
        Ok(Self {
            image,
            version_tag,
            revision,
            latest_policy: settings.latest_policy,
        })
    }

    pub fn version_ref(&self) -> String {
        format!("{}:{}", self.image, self.version_tag)
    }

    pub fn revision_ref(&self) -> String {
        format!("{}:{}", self.image, self.revision.tag())
    }

    pub fn latest_ref(&self) -> String {
        format!("{}:{LATEST_TAG}", self.image)
    }
}

/// Outcome of the latest-tag policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Promotion {
    Promote,
    Skip(String),
}

/// Decide whether `latest` moves. A `None` branch never promotes under `auto`.
pub fn promotion(policy: LatestPolicy, branch: Option<&str>, trunk: &str) -> Promotion {
    match (policy, branch) {
        (LatestPolicy::Never, _) => {
            Promotion::Skip("skipping 'latest' (PUSH_LATEST=false)".to_string())
        }
        (LatestPolicy::Always, _) => Promotion::Promote,
        (LatestPolicy::Auto, Some(branch)) if branch == trunk => Promotion::Promote,
        (LatestPolicy::Auto, Some(branch)) => Promotion::Skip(format!(
            "skipping 'latest': on branch '{branch}', not '{trunk}' (PUSH_LATEST=auto)"
        )),
        (LatestPolicy::Auto, None) => Promotion::Skip(format!(
            "skipping 'latest': current branch unknown or detached, not '{trunk}' (PUSH_LATEST=auto)"
        )),
    }
}

/// Runs the guarded release stages against one environment.
pub struct Publisher<'a> {
    env: &'a EnvironmentConfig,
    settings: ReleaseSettings,
    credentials: RegistryCredentials,
    dispatcher: &'a dyn Dispatcher,
    output: &'a Output,
}

impl<'a> Publisher<'a> {
    pub fn new(
        env: &'a EnvironmentConfig,
        settings: ReleaseSettings,
        credentials: RegistryCredentials,
        dispatcher: &'a dyn Dispatcher,
        output: &'a Output,
    ) -> Self {
        Self {
            env,
            settings,
            credentials,
            dispatcher,
            output,
        }
    }

    fn guard(&self, action: &'static str) -> Result<()> {
        guard::evaluate(&self.env.env, self.settings.identity()).enforce(action)
    }

    /// Guard `action`, then reject bad IMAGE or VERSION values before
    /// anything is dispatched.
    fn preflight(&self, action: &'static str) -> Result<()> {
        self.guard(action)?;
        self.settings.image_ref()?;
        self.settings.version_tag()?;
        Ok(())
    }

    fn docker(&self) -> CommandInvocation {
        CommandInvocation::new(&self.settings.docker)
    }

    /// Resolve the current revision and build the descriptor for it.
    pub async fn describe(&self) -> Result<ReleaseDescriptor> {
        let revision = resolve_revision(self.dispatcher).await?;
        ReleaseDescriptor::new(&self.settings, revision)
    }

    pub async fn login(&self) -> Result<()> {
        self.guard("release-login")?;
        let token = self.credentials.require_token()?;
        let image = self.settings.image_ref()?;
        let registry = self.settings.login_registry(&image);
        let username = self.credentials.username_or(&self.settings.owner);

        self.output
            .progress(&format!("  → Logging in to {registry} as {username}..."));
        let invocation = self
            .docker()
            .args(["login", registry.as_str(), "-u", username, "--password-stdin"])
            .stdin(token.clone());
        self.dispatcher.run(&invocation).await?;
        Ok(())
    }

    pub async fn build(&self) -> Result<ReleaseDescriptor> {
        self.preflight("release-build")?;
        let descriptor = self.describe().await?;
        self.build_with(&descriptor).await?;
        Ok(descriptor)
    }

    /// Build a single-platform image carrying the version and revision tags.
    pub async fn build_with(&self, descriptor: &ReleaseDescriptor) -> Result<()> {
        self.guard("release-build")?;
        self.output.progress(&format!(
            "  → Building {} and {}...",
            descriptor.version_ref(),
            descriptor.revision_ref()
        ));

        let mut invocation = self.docker().args([
            "build",
            "--platform",
            self.settings.platform.as_str(),
            "-f",
        ]);
        invocation = invocation
            .arg(self.settings.dockerfile.display().to_string())
            .args(["-t".to_string(), descriptor.version_ref()])
            .args(["-t".to_string(), descriptor.revision_ref()]);
        for (key, value) in self.labels(descriptor) {
            invocation = invocation.arg("--label").arg(format!("{key}={value}"));
        }
        invocation = invocation.arg(self.settings.context.display().to_string());

        self.dispatcher.run(&invocation).await?;
        Ok(())
    }

    /// OCI labels attached to the image.
    pub fn labels(&self, descriptor: &ReleaseDescriptor) -> Vec<(&'static str, String)> {
        vec![
            ("org.opencontainers.image.title", self.settings.repo.clone()),
            (
                "org.opencontainers.image.source",
                format!(
                    "https://github.com/{}/{}",
                    self.settings.owner, self.settings.repo
                ),
            ),
            (
                "org.opencontainers.image.version",
                descriptor.version_tag.clone(),
            ),
            (
                "org.opencontainers.image.revision",
                descriptor.revision.full().to_string(),
            ),
        ]
    }

    pub async fn push(&self) -> Result<ReleaseDescriptor> {
        self.preflight("release-push")?;
        let descriptor = self.describe().await?;
        self.push_with(&descriptor).await?;
        Ok(descriptor)
    }

    /// Push both tags, then apply the latest policy.
    pub async fn push_with(&self, descriptor: &ReleaseDescriptor) -> Result<()> {
        self.guard("release-push")?;

        for reference in [descriptor.version_ref(), descriptor.revision_ref()] {
            self.output.progress(&format!("  → Pushing {reference}..."));
            self.dispatcher
                .run(&self.docker().args(["push".to_string(), reference]))
                .await?;
        }

        let branch = match descriptor.latest_policy {
            LatestPolicy::Auto => current_branch(self.dispatcher).await,
            _ => None,
        };
        match promotion(
            descriptor.latest_policy,
            branch.as_deref(),
            &self.settings.trunk_branch,
        ) {
            Promotion::Promote => {
                let latest = descriptor.latest_ref();
                self.output.progress(&format!("  → Promoting {latest}..."));
                self.dispatcher
                    .run(&self.docker().args([
                        "tag".to_string(),
                        descriptor.version_ref(),
                        latest.clone(),
                    ]))
                    .await?;
                self.dispatcher
                    .run(&self.docker().args(["push".to_string(), latest]))
                    .await?;
            }
            Promotion::Skip(reason) => self.output.info(&reason),
        }
        Ok(())
    }

    /// Print the registry manifest and image labels. Never fails once the
    /// guard passes; problems are returned as warnings.
    pub async fn show(&self) -> Result<Diagnostics> {
        self.guard("release-show")?;
        let image = self.settings.image_ref()?;
        let reference = image
            .tagged(self.settings.version.trim())
            .map_err(|e| Error::usage(format!("VERSION must be a valid image tag: {e}")))?;
        let mut diag = Diagnostics::default();

        self.output
            .progress(&format!("  → Manifest for {reference}:"));
        let manifest = self
            .docker()
            .args(["buildx", "imagetools", "inspect", reference.as_str()]);
        if let Err(e) = self.dispatcher.run(&manifest).await {
            diag.warn(Warning::manifest(format!(
                "could not inspect manifest for {reference}: {e}"
            )));
        }

        self.output.progress(&format!("  → Labels for {reference}:"));
        let labels = self.docker().args([
            "image",
            "inspect",
            "--format",
            "{{json .Config.Labels}}",
            reference.as_str(),
        ]);
        if let Err(e) = self.dispatcher.run(&labels).await {
            let message = match e.kind() {
                DispatchErrorKind::NotFound => {
                    format!("label inspection unavailable ({e}); skipping labels")
                }
                _ => format!("could not read labels for {reference}: {e}"),
            };
            diag.warn(Warning::labels(message));
        }

        Ok(diag)
    }

    /// Login, build, and push in order, stopping at the first failure.
    pub async fn publish(&self) -> Result<ReleaseDescriptor> {
        self.preflight("release-publish")?;
        self.login().await?;
        let descriptor = self.describe().await?;
        self.build_with(&descriptor).await?;
        self.push_with(&descriptor).await?;
        Ok(descriptor)
    }
}
