//! `run`: one reconciliation pass over the update queue

use anyhow::Result;
use colored::*;

use super::RunArgs;
use crate::config::Config;
use crate::reconcile::summary::applied_verb;
use crate::reconcile::{OperationKind, Reconciler, RunOptions, RunReport, XlsxWorkspace};

pub fn handle_run_command(config: &Config, args: RunArgs) -> Result<()> {
    let workspace = XlsxWorkspace::new(config);
    let rejections_path = workspace.rejections_path();
    let archive_path = workspace.archive_path();

    let mut reconciler = Reconciler::new(
        workspace,
        RunOptions {
            dry_run: args.dry_run,
        },
    );
    let report = reconciler.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);

    if report.dry_run {
        println!("{}", "Dry run: nothing was written".yellow());
        return Ok(());
    }

    if report.rejections_persisted {
        println!(
            "{} {} record(s) rejected, see {}",
            "Warning:".yellow().bold(),
            report.rejections.len(),
            rejections_path.display().to_string().cyan()
        );
    } else if !report.rejections.is_empty() {
        println!(
            "{} {} record(s) rejected but the rejection report could not be written",
            "Error:".red().bold(),
            report.rejections.len()
        );
    }

    if report.archived {
        println!(
            "{} update queue archived to {}",
            "Done:".green().bold(),
            archive_path.display().to_string().cyan()
        );
    } else {
        println!(
            "{} master saved but the update queue was not archived; remove it before the next run",
            "Error:".red().bold()
        );
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("{}", "Reconciliation summary".bold());

    for kind in OperationKind::ALL {
        let counts = report.summary.counts(kind);
        if counts == Default::default() {
            continue;
        }

        let rejected = if counts.rejected > 0 {
            counts.rejected.to_string().red()
        } else {
            counts.rejected.to_string().normal()
        };
        println!(
            "  {:<18} {} {:>4}   rejected {:>4}   skipped {:>4}",
            kind.sheet_name(),
            format!("{:<14}", applied_verb(kind)).dimmed(),
            counts.applied.to_string().green(),
            rejected,
            counts.skipped,
        );
    }

    if report.summary.certifications_cascaded > 0 {
        println!(
            "  {} training record(s) removed with their employee or skill",
            report.summary.certifications_cascaded
        );
    }
    if report.summary.certifications_replaced > 0 {
        println!(
            "  {} training record(s) replaced by newer certifications",
            report.summary.certifications_replaced
        );
    }

    println!(
        "  {} applied, {} rejected",
        report.summary.total_applied().to_string().green().bold(),
        report.summary.total_rejected().to_string().red().bold()
    );

    for record in &report.rejections {
        println!(
            "    {} row {}: {} ({})",
            record.operation,
            record.row_number,
            record.reason.code().red(),
            record.reason
        );
    }
}
