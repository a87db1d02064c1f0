//! actionsync: keep generated GitHub Action artifacts in sync with a repository.
//!
//! # Usage
//!
//! ```text
//! actionsync generate [--root DIR] [--manifest FILE] [--name N] [--desc D] [--icon I] [--color C] [--templates DIR]
//! actionsync diff     [same manifest flags]
//! actionsync run      [same manifest flags] [--email E] [--github-token T]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, generate::GenerateArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(
    name = "actionsync",
    version,
    about = "Generate action.yml and Dockerfile, then commit, push or report the drift",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render and write the action artifacts.
    Generate(GenerateArgs),

    /// Show how the generated artifacts differ from HEAD.
    Diff(DiffArgs),

    /// Generate, then push or report the drift according to the CI trigger.
    Run(RunArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Run(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
