use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{PreviewReport, Reconciler};

use crate::Context;
use crate::cli::SelectArgs;
use crate::ui;

pub fn run(ctx: &Context, select: &SelectArgs) -> Result<()> {
    let (registry, resources) = super::load(ctx, select)?;
    let reports = Reconciler::new(&registry).preview(&resources);

    ui::header("Previews");
    let failed = reports.iter().filter(|r| print_report(r)).count();

    if failed > 0 {
        bail!("{failed} previews failed");
    }
    Ok(())
}

/// Print one preview line; returns true if it failed
fn print_report(report: &PreviewReport) -> bool {
    match &report.result {
        Ok(preview) => {
            println!("  {} {} {}", "✓".green(), report.key, preview.url.cyan());
            false
        }
        Err(e) if e.is_not_implemented() => {
            ui::dim(&format!("{} preview not supported", report.key));
            false
        }
        Err(e) => {
            ui::error(&format!("{}: {e}", report.key));
            true
        }
    }
}
