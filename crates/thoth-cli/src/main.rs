use std::time::Duration;

use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;
mod write_lock;

/// How long a writer waits for another `thoth` process to release the index.
const WRITE_LOCK_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        output::error::report(&error);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    let flags = cli.global_flags();

    if let cli::Commands::Schema(args) = &cli.command {
        return commands::schema::handle(args, &flags);
    }

    let project_root = context::resolve_project_root(flags.project.as_deref())?;
    let config = thoth_config::ThothConfig::load_with_dotenv(&project_root)
        .context("failed to load thoth configuration")?;
    let ctx = context::AppContext::new(project_root, config);

    let command = cli.command;
    let write_lock = if command_requires_write_lock(&command) {
        Some(write_lock::acquire(&ctx.project_root, WRITE_LOCK_TIMEOUT).await?)
    } else {
        None
    };

    let result = commands::dispatch::dispatch(command, &ctx, &flags).await;
    drop(write_lock);
    result
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("THOTH_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

const fn command_requires_write_lock(command: &cli::Commands) -> bool {
    match command {
        cli::Commands::Touch(args) => args.record,
        cli::Commands::Index {
            action: cli::subcommands::IndexCommands::Build { .. },
        } => true,
        _ => false,
    }
}
