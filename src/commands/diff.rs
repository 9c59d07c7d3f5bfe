use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{DiffReport, DiffSummary, Reconciler, group_by_kind};

use crate::Context;
use crate::cli::SelectArgs;
use crate::ui;

pub fn run(ctx: &Context, select: &SelectArgs) -> Result<()> {
    let (registry, resources) = super::load(ctx, select)?;
    let reports = Reconciler::new(&registry).diff(&resources);

    for (kind, group) in group_by_kind(&reports) {
        ui::header(&format!("{kind} ({})", group.len()));
        for report in group {
            print_report(report, ctx.verbose > 0);
        }
    }

    let summary = DiffSummary::from_reports(&reports);
    ui::diff_summary(&summary);

    if summary.errors > 0 {
        bail!("{} resources could not be compared", summary.errors);
    }
    Ok(())
}

fn print_report(report: &DiffReport, show_unchanged: bool) {
    match &report.result {
        Ok(diff) if diff.is_addition() => {
            println!("{} {}", "+".green(), report.key.to_string().green());
            ui::unified_diff(&diff.unified());
        }
        Ok(diff) if diff.is_modification() => {
            println!("{} {}", "~".yellow(), report.key.to_string().yellow());
            ui::unified_diff(&diff.unified());
        }
        Ok(_) => {
            if show_unchanged {
                ui::dim(&format!("{} unchanged", report.key));
            }
        }
        Err(e) => ui::error(&format!("{}: {e}", report.key)),
    }
}
