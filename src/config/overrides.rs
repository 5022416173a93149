// ABOUTME: Command-line KEY=VALUE assignments.
// ABOUTME: Parsed from --set arguments and applied as the top settings layer.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Every setting key accepted by `--set` and `BRIEFEX_<KEY>`.
pub const KEYS: &[&str] = &[
    "ENV",
    "COMPOSE_FILE",
    "PROJECT",
    "SERVICE",
    "LOG_TAIL",
    "DOCKER",
    "ALEMBIC",
    "MIGRATION_MODE",
    "MIGRATION_SERVICE",
    "DOCKERFILE",
    "PLATFORM",
    "REGISTRY",
    "IMAGE",
    "OWNER",
    "REPO",
    "VERSION",
    "PUSH_LATEST",
    "TRUNK_BRANCH",
];

/// A single `KEY=VALUE` pair. The value may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub value: String,
}

impl Assignment {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>> {
        raw.iter().map(|s| s.as_ref().parse()).collect()
    }
}

impl FromStr for Assignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok(Self::new(key.trim().to_ascii_uppercase(), value))
            }
            _ => Err(Error::usage(format!(
                "expected KEY=VALUE, got {s:?} (for example --set ENV=prod)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        let a: Assignment = "VERSION=v1=rc".parse().unwrap();
        assert_eq!(a, Assignment::new("VERSION", "v1=rc"));
    }

    #[test]
    fn allows_empty_value() {
        let a: Assignment = "owner=".parse().unwrap();
        assert_eq!(a, Assignment::new("OWNER", ""));
    }

    #[test]
    fn rejects_missing_equals_or_key() {
        assert!("ENV".parse::<Assignment>().is_err());
        assert!("=prod".parse::<Assignment>().is_err());
    }
}
