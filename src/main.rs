use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::ConverterKind;

mod commands;
mod config;
mod convert;
mod git;
mod publish;

#[derive(Parser)]
#[command(name = "pagecast", version, about = "Publish a README as a static index page")]
struct Args {
    /// The command to execute (defaults to `publish`)
    #[command(subcommand)]
    command: Option<PagecastCommand>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Default)]
struct PublishArgs {
    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Print the steps without touching the repository
    #[arg(long)]
    dry_run: bool,

    /// Switch back to the main branch when a step fails
    #[arg(long)]
    restore_on_failure: bool,

    /// Override the converter from the config file
    #[arg(long, value_enum)]
    converter: Option<ConverterKind>,

    /// Print the publish report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct InitArgs {
    /// The directory to write pagecast.yaml into
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Overwrite an existing config file
    #[arg(short, long)]
    force: bool,
}

#[derive(Subcommand)]
enum PagecastCommand {
    /// Regenerate the index page and commit it to the publish branch
    Publish(PublishArgs),

    /// Write a pagecast.yaml holding the default settings
    Init(InitArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "info" })
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        None => {
            commands::publish::run(&PublishArgs::default()).await?;
        }
        Some(PagecastCommand::Publish(args)) => {
            commands::publish::run(&args).await?;
        }
        Some(PagecastCommand::Init(args)) => {
            commands::init::run(&args).await?;
        }
    }

    Ok(())
}
