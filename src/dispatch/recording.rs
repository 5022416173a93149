// ABOUTME: Dispatcher that records invocations instead of spawning processes.
// ABOUTME: Backs --dry-run and lets tests script exit codes and captured output.

use super::{CommandInvocation, DispatchError, Dispatcher};
use crate::output::Output;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Scripted outcome for invocations matching a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    /// Exit with the given code (`None` = killed by a signal).
    Fail(Option<i32>),
    /// Succeed and, when captured, print this on stdout.
    Output(String),
    /// Behave as if the program is not installed.
    NotFound,
}

/// Records every invocation and answers from a list of scripted rules.
///
/// A rule matches when its words appear contiguously in the program followed
/// by its arguments. The first matching rule wins; unmatched invocations
/// succeed and capture `default_capture`.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<CommandInvocation>>,
    rules: Vec<(Vec<String>, Scripted)>,
    default_capture: String,
    echo: Option<Output>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo each command through `output` instead of running it.
    /// Captures yield `placeholder`.
    pub fn dry_run(placeholder: &str, output: Output) -> Self {
        Self {
            default_capture: placeholder.to_string(),
            echo: Some(output),
            ..Self::default()
        }
    }

    pub fn on<I, S>(mut self, words: I, outcome: Scripted) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .push((words.into_iter().map(Into::into).collect(), outcome));
        self
    }

    pub fn calls(&self) -> Vec<CommandInvocation> {
        self.calls.lock().clone()
    }

    /// Each recorded call rendered as one display string.
    pub fn rendered(&self) -> Vec<String> {
        self.calls.lock().iter().map(ToString::to_string).collect()
    }

    fn record(&self, invocation: &CommandInvocation) -> Option<Scripted> {
        if let Some(output) = &self.echo {
            output.command(&invocation.to_string());
        }
        self.calls.lock().push(invocation.clone());

        let words: Vec<&str> = std::iter::once(invocation.program.as_str())
            .chain(invocation.args.iter().map(String::as_str))
            .collect();

        self.rules
            .iter()
            .find(|(pattern, _)| {
                pattern.is_empty()
                    || words
                        .windows(pattern.len())
                        .any(|w| w.iter().zip(pattern).all(|(a, b)| *a == b.as_str()))
            })
            .map(|(_, outcome)| outcome.clone())
    }

    fn outcome(
        invocation: &CommandInvocation,
        outcome: Scripted,
    ) -> Result<String, DispatchError> {
        let program = invocation.program.clone();
        match outcome {
            Scripted::Output(out) => Ok(out.trim().to_string()),
            Scripted::Fail(code) => Err(DispatchError::Exit { program, code }),
            Scripted::NotFound => Err(DispatchError::Spawn {
                program,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            }),
        }
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn run(&self, invocation: &CommandInvocation) -> Result<(), DispatchError> {
        match self.record(invocation) {
            Some(outcome) => Self::outcome(invocation, outcome).map(|_| ()),
            None => Ok(()),
        }
    }

    async fn capture(&self, invocation: &CommandInvocation) -> Result<String, DispatchError> {
        match self.record(invocation) {
            Some(outcome) => Self::outcome(invocation, outcome),
            None => Ok(self.default_capture.clone()),
        }
    }
}
