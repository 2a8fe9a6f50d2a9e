//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Incus Seed - Compose cloud-init seed documents from instance and profile config
#[derive(Parser, Debug)]
#[command(name = "incus-seed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose user-data and vendor-data documents from raw config maps
    Compose(commands::compose::ComposeArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        match self.command {
            Commands::Compose(args) => commands::compose::execute(args),
        }
    }
}
