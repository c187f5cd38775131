//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use commands::{CheckArgs, InitArgs, RunArgs};

#[derive(Parser)]
#[command(
    name = "roster-sync",
    version,
    about = "Apply queued roster changes to the master skills workbook"
)]
pub struct Cli {
    /// Config file (default: <config dir>/roster-sync/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the master and queue workbooks
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory receiving archived queues and rejection reports
    #[arg(long, global = true, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the update queue to the master workbook
    Run(RunArgs),
    /// Check the master workbook for referential-integrity problems
    Check(CheckArgs),
    /// Create the data directories and a template master workbook
    Init(InitArgs),
}

impl Cli {
    /// Config file, then environment, then flags
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        config.apply_overrides(self.data_dir.clone(), self.archive_dir.clone());
        Ok(config)
    }
}

/// Dispatch a parsed command line
pub fn execute(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.resolve_config()?;
    log::debug!("Using config: {:?}", config);

    match cli.command {
        Commands::Run(args) => commands::run::handle_run_command(&config, args),
        Commands::Check(args) => commands::check::handle_check_command(&config, args),
        Commands::Init(args) => commands::init::handle_init_command(&config, args),
    }
}
