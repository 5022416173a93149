// ABOUTME: Container image repository references and tag validation.
// ABOUTME: Builds registry/owner/repo references and renders repo:tag strings.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("image reference must not carry a tag or digest: {0}")]
    HasTag(String),

    #[error("invalid image tag: {0:?}")]
    InvalidTag(String),
}

/// A repository reference such as `ghcr.io/acme/briefex`, without a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    registry: Option<String>,
    name: String,
}

impl ImageRef {
    /// Build `<registry>/<owner>/<repo>`, lower-cased as registries require.
    pub fn for_repository(
        registry: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Self, ParseImageRefError> {
        Self::parse(&format!("{registry}/{owner}/{repo}"))
    }

    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim().to_ascii_lowercase();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        for c in input.chars() {
            if !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_' | '@') {
                return Err(ParseImageRefError::InvalidChar(c));
            }
        }

        if input.contains('@') {
            return Err(ParseImageRefError::HasTag(input));
        }

        // A colon after the last slash is a tag; before it, a registry port.
        let last = input.rsplit('/').next().unwrap_or_default();
        if last.contains(':') {
            return Err(ParseImageRefError::HasTag(input));
        }

        match input.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                Ok(Self {
                    registry: Some(first.to_string()),
                    name: rest.to_string(),
                })
            }
            _ => Ok(Self {
                registry: None,
                name: input,
            }),
        }
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Render `<image>:<tag>` after validating the tag.
    pub fn tagged(&self, tag: &str) -> Result<String, ParseImageRefError> {
        validate_tag(tag)?;
        Ok(format!("{self}:{tag}"))
    }
}

/// Tags are `[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}`.
pub fn validate_tag(tag: &str) -> Result<(), ParseImageRefError> {
    let invalid = || ParseImageRefError::InvalidTag(tag.to_string());
    let first = tag.chars().next().ok_or_else(invalid)?;
    if tag.len() > 128 || !(first.is_ascii_alphanumeric() || first == '_') {
        return Err(invalid());
    }
    if tag
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '.' | '-'))
    {
        return Err(invalid());
    }
    Ok(())
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{}/", registry)?;
        }
        write!(f, "{}", self.name)
    }
}
