// ABOUTME: Entry point for the briefex-ops CLI application.
// ABOUTME: Layers settings, resolves the environment, and runs one operation.

mod cli;

use briefex_ops::commands::{self, Context, Operation};
use briefex_ops::config::{Assignment, RegistryCredentials, Settings};
use briefex_ops::dispatch::{Dispatcher, ProcessDispatcher, RecordingDispatcher};
use briefex_ops::environment::{EnvironmentConfig, EnvironmentInputs};
use briefex_ops::error::Result;
use briefex_ops::output::{Output, OutputMode};
use clap::Parser;
use cli::Cli;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);
    output.start_timer();

    match run(cli, &output).await {
        Ok(name) => output.success(&format!("✓ {name} complete")),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli, output: &Output) -> Result<String> {
    let cwd = env::current_dir()?;

    let mut assignments = Assignment::parse_all(&cli.set)?;
    if let Some(name) = cli.env {
        assignments.push(Assignment::new("ENV", name));
    }
    let settings = Settings::layered(&cwd, cli.config.as_deref(), env::vars(), &assignments)?;

    let operation: Operation = cli.command.into_operation()?;
    let environment = EnvironmentConfig::resolve(&EnvironmentInputs::from(&settings), &cwd)?;

    let process = ProcessDispatcher::new();
    let recorder = RecordingDispatcher::dry_run("dry-run", output.clone());
    let dispatcher: &dyn Dispatcher = if cli.dry_run { &recorder } else { &process };

    output.progress(&format!(
        "{} [{} / {}]",
        operation.name(),
        environment.env,
        environment.project
    ));

    let ctx = Context {
        settings,
        env: environment,
        credentials: RegistryCredentials::from_env(),
        dispatcher,
        output,
    };
    commands::execute(&operation, &ctx).await?;
    Ok(operation.name())
}
