// ABOUTME: Registry credentials sourced from environment variables.
// ABOUTME: Threaded explicitly into the release publisher; the token stays a Secret.

use crate::error::{Error, Result};
use crate::types::Secret;

pub const USERNAME_VAR: &str = "GHCR_USERNAME";
pub const TOKEN_VAR: &str = "GHCR_TOKEN";

#[derive(Debug, Clone, Default)]
pub struct RegistryCredentials {
    pub username: Option<String>,
    pub token: Option<Secret>,
}

impl RegistryCredentials {
    pub fn new(username: Option<String>, token: Option<Secret>) -> Self {
        Self { username, token }
    }

    /// Read credentials through `lookup`, so callers decide where variables
    /// come from. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        Self {
            username: present(USERNAME_VAR),
            token: present(TOKEN_VAR).map(Secret::new),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Username for `docker login`, falling back to the registry owner.
    pub fn username_or<'a>(&'a self, owner: &'a str) -> &'a str {
        self.username.as_deref().unwrap_or(owner)
    }

    pub fn require_token(&self) -> Result<&Secret> {
        self.token.as_ref().ok_or_else(|| {
            Error::usage(format!(
                "{TOKEN_VAR} is not set; export a registry token with package write access \
                 (and optionally {USERNAME_VAR}) before running release-login"
            ))
        })
    }
}
