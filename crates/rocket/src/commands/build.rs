//! `rocket build` command implementation.

use std::path::PathBuf;

use clap::Args;
use rocket_config::{CliSettings, Config};
use rocket_site::SiteBuilder;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover rocket.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Output directory, relative to the site root (overrides config).
    #[arg(short, long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// Base URL used by the `site_url` filter (overrides config).
    #[arg(long, env = "ROCKET_BASE_URL")]
    pub(crate) base_url: Option<String>,

    /// Enable verbose output (show build progress).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            output_dir: self.output_dir.clone(),
            base_url: self.base_url.clone(),
        }
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        output.locations(&config);

        let builder = SiteBuilder::new(config);
        let report = builder.build()?;
        output.built(&report, &builder.config().output_path);
        Ok(())
    }
}
