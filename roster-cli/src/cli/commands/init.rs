//! `init`: lay out a fresh workspace

use anyhow::{Context, Result, bail};
use chrono::Local;
use colored::*;
use std::fs;
use std::path::Path;

use super::InitArgs;
use crate::config::Config;
use crate::reconcile::excel::{write_master_workbook, write_queue_workbook};
use crate::reconcile::seed::{sample_batch, sample_store};

pub fn handle_init_command(config: &Config, args: InitArgs) -> Result<()> {
    for dir in [&config.data_dir, &config.archive_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }

    let master_path = config.master_path();
    refuse_overwrite(&master_path, args.force)?;
    write_master_workbook(&sample_store()?, &master_path)?;
    log::info!("Template master workbook written to {}", master_path.display());
    println!(
        "{} {}",
        "Created".green().bold(),
        master_path.display().to_string().cyan()
    );

    if args.sample_queue {
        let queue_path = config.queue_path();
        refuse_overwrite(&queue_path, args.force)?;
        write_queue_workbook(&sample_batch(Local::now().date_naive()), &queue_path)?;
        println!(
            "{} {}",
            "Created".green().bold(),
            queue_path.display().to_string().cyan()
        );
    }

    Ok(())
}

fn refuse_overwrite(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    Ok(())
}
