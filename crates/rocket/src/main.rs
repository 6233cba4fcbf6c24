//! Rocket CLI - static site generator.
//!
//! Provides commands for:
//! - `build`: Render the site into its output directory (the default)

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::BuildArgs;
use output::Output;

/// Rocket - static site generator.
#[derive(Parser)]
#[command(name = "rocket", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for the default build command.
    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site (default when no command is given).
    Build(BuildArgs),
}

impl Cli {
    /// The build arguments of the selected command.
    fn into_build_args(self) -> BuildArgs {
        match self.command {
            Some(Commands::Build(args)) => args,
            None => self.build,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();
    let args = cli.into_build_args();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
