//! `check`: audit the master workbook

use anyhow::{Result, bail};
use colored::*;

use super::CheckArgs;
use crate::config::Config;
use crate::reconcile::excel::read_master_workbook;
use crate::reconcile::integrity;
use crate::reconcile::types::TableKind;

pub fn handle_check_command(config: &Config, args: CheckArgs) -> Result<()> {
    let master_path = config.master_path();
    let store = read_master_workbook(&master_path)?;
    let issues = integrity::check(&store);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
    } else {
        println!(
            "Checked {}",
            master_path.display().to_string().cyan()
        );
        for table in TableKind::ALL {
            println!("  {:<20} {:>5} row(s)", table.sheet_name(), store.len(table));
        }
        for issue in &issues {
            println!("  {} {}", "✗".red(), issue);
        }
    }

    if !issues.is_empty() {
        bail!("{} integrity issue(s) found", issues.len());
    }

    if !args.json {
        println!("{}", "No integrity issues found".green());
    }
    Ok(())
}
