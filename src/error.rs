// ABOUTME: Application-wide error types for briefex-ops.
// ABOUTME: Uses thiserror; maps each failure class to a process exit code.

use crate::dispatch::DispatchError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The resolved environment is unusable (missing compose file, bad name, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A required parameter for the chosen operation was not supplied.
    #[error("usage error: {0}")]
    Usage(String),

    /// A privileged operation was attempted without satisfying its guard.
    #[error("refusing to run {action}: {}", .reasons.join("; "))]
    GuardRejected {
        action: &'static str,
        reasons: Vec<String>,
    },

    #[error(transparent)]
    ExternalProcess(#[from] DispatchError),

    /// A value that had to be read from an external tool could not be resolved.
    #[error("could not resolve {0}")]
    Resolution(String),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Exit status the CLI terminates with for this error.
    ///
    /// Failed child processes propagate their own exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Configuration(_)
            | Error::Usage(_)
            | Error::GuardRejected { .. }
            | Error::ConfigNotFound(_)
            | Error::Yaml(_) => 2,
            Error::ExternalProcess(e) => e.exit_code().filter(|c| *c != 0).unwrap_or(1),
            Error::Resolution(_) | Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
