// ABOUTME: Dispatcher backed by real child processes via tokio::process.
// ABOUTME: Streams stdio through, pipes secrets on stdin, no retries or timeouts.

use super::{
    CommandInvocation, DispatchError, Dispatcher, ExitSnafu, OutputSnafu, SpawnSnafu, StdinSnafu,
};
use async_trait::async_trait;
use snafu::{OptionExt, ResultExt};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Spawns each invocation as a child process and waits for it to finish.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessDispatcher;

impl ProcessDispatcher {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &CommandInvocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).envs(&invocation.env);
        cmd.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        cmd
    }
}

#[async_trait]
impl Dispatcher for ProcessDispatcher {
    async fn run(&self, invocation: &CommandInvocation) -> Result<(), DispatchError> {
        tracing::debug!(command = %invocation, "dispatching");
        let program = invocation.program.as_str();

        let mut child = Self::command(invocation)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context(SpawnSnafu { program })?;

        let written = match (&invocation.stdin, child.stdin.take()) {
            (Some(secret), Some(mut stdin)) => {
                let result = stdin.write_all(secret.expose().as_bytes()).await;
                // Dropping closes the pipe so the child sees EOF.
                drop(stdin);
                result
            }
            _ => Ok(()),
        };

        // A child that exits before reading stdin breaks the pipe; its exit
        // status is the more useful error.
        let status = child.wait().await.context(SpawnSnafu { program })?;
        if !status.success() {
            tracing::debug!(program, code = ?status.code(), "command failed");
            return ExitSnafu {
                program,
                code: status.code(),
            }
            .fail();
        }
        written.context(StdinSnafu { program })
    }

    async fn capture(&self, invocation: &CommandInvocation) -> Result<String, DispatchError> {
        tracing::debug!(command = %invocation, "capturing");
        let program = invocation.program.as_str();

        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .context(SpawnSnafu { program })?;

        if !output.status.success() {
            return ExitSnafu {
                program,
                code: output.status.code(),
            }
            .fail();
        }

        String::from_utf8(output.stdout)
            .ok()
            .map(|s| s.trim().to_string())
            .context(OutputSnafu { program })
    }
}
