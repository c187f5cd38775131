//! Subcommand arguments and handlers

pub mod check;
pub mod init;
pub mod run;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Reconcile and report without saving, archiving or writing rejections
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Print issues as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite existing workbooks
    #[arg(long)]
    pub force: bool,

    /// Also write a sample update queue touching every operation kind
    #[arg(long)]
    pub sample_queue: bool,
}
