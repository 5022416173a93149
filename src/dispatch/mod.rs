// ABOUTME: Process dispatching seam between controllers and external tools.
// ABOUTME: Defines CommandInvocation, the Dispatcher trait, and dispatch errors.

mod process;
mod recording;

pub use process::ProcessDispatcher;
pub use recording::{RecordingDispatcher, Scripted};

use crate::types::Secret;
use async_trait::async_trait;
use snafu::Snafu;
use std::collections::BTreeMap;
use std::fmt;

/// One external process call: program, ordered arguments, extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Written to the child's stdin, then closed. Used for credentials so they
    /// never show up in process listings.
    pub stdin: Option<Secret>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn stdin(mut self, secret: Secret) -> Self {
        self.stdin = Some(secret);
        self
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.env {
            write!(f, "{k}={} ", quote(v))?;
        }
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        if self.stdin.is_some() {
            write!(f, " <<< [redacted]")?;
        }
        Ok(())
    }
}

/// Single-quote a word for display when it contains shell metacharacters.
fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Errors surfaced by a dispatched process.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DispatchError {
    #[snafu(display("failed to start {program}: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("could not write to {program} stdin: {source}"))]
    Stdin {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("{program} {}", describe_exit(code)))]
    Exit { program: String, code: Option<i32> },

    #[snafu(display("{program} produced non-UTF-8 output"))]
    Output { program: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// The executable could not be found.
    NotFound,
    /// The executable exists but could not be started.
    SpawnFailed,
    /// Input could not be handed to the running process.
    StdinFailed,
    /// The process ran and exited unsuccessfully.
    NonZeroExit,
    /// The process output could not be decoded.
    BadOutput,
}

impl DispatchError {
    pub fn kind(&self) -> DispatchErrorKind {
        match self {
            DispatchError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                DispatchErrorKind::NotFound
            }
            DispatchError::Spawn { .. } => DispatchErrorKind::SpawnFailed,
            DispatchError::Stdin { .. } => DispatchErrorKind::StdinFailed,
            DispatchError::Exit { .. } => DispatchErrorKind::NonZeroExit,
            DispatchError::Output { .. } => DispatchErrorKind::BadOutput,
        }
    }

    /// The child's exit code, if it ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DispatchError::Exit { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// Runs external commands one at a time.
///
/// `run` streams the child's output through to the terminal; `capture`
/// returns its trimmed stdout for callers that need a value.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn run(&self, invocation: &CommandInvocation) -> Result<(), DispatchError>;

    async fn capture(&self, invocation: &CommandInvocation) -> Result<String, DispatchError>;
}
