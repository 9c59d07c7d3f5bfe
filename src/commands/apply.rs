use anyhow::{Result, bail};
use reconcile::{
    ApplyOptions, ApplyReport, ApplyStatus, ApplySummary, ProgressCallback, Reconciler, ResourceKey,
};

use crate::Context;
use crate::cli::ApplyArgs;
use crate::ui;

/// Prints each resource as it completes
struct ConsoleProgress {
    quiet: bool,
}

impl ProgressCallback for ConsoleProgress {
    fn on_batch_start(&mut self, count: usize) {
        log::debug!("Applying {count} resources");
    }

    fn on_resource_start(&mut self, key: &ResourceKey) {
        log::trace!("Applying {key}");
    }

    fn on_resource_complete(&mut self, key: &ResourceKey, status: &ApplyStatus) {
        let quiet_ok = self.quiet && matches!(status, ApplyStatus::Done(_));
        if !quiet_ok {
            ui::apply_status(key, status);
        }
    }

    fn on_batch_complete(&mut self, summary: &ApplySummary) {
        if !self.quiet {
            ui::apply_summary(summary);
        }
    }
}

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let (registry, resources) = super::load(ctx, &args.select)?;

    if resources.is_empty() {
        ui::warn("No declared resources matched");
        return Ok(());
    }

    if !ctx.quiet {
        ui::header("Applying Resources");
    }

    let options = ApplyOptions {
        jobs: args.jobs.max(1),
        fail_fast: args.fail_fast,
    };
    let mut progress = ConsoleProgress { quiet: ctx.quiet };
    let reports = Reconciler::new(&registry)
        .with_options(options)
        .apply(&resources, &mut progress)?;

    check(&reports)
}

/// Fail the command when any resource failed
fn check(reports: &[ApplyReport]) -> Result<()> {
    let summary = ApplySummary::from_reports(reports);
    if summary.failed > 0 {
        bail!("{} of {} resources failed to apply", summary.failed, summary.total());
    }
    Ok(())
}
