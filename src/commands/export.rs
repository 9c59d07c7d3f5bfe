use anyhow::Result;
use std::path::Path;

use crate::Context;
use crate::cli::SelectArgs;
use crate::ui;

/// Write each selected resource to `<output>/<kind>/<filename>.<ext>`
pub fn run(ctx: &Context, select: &SelectArgs, output: &Path) -> Result<()> {
    let (registry, resources) = super::load(ctx, select)?;
    let written = reconcile::export(&registry, &resources, output)?;

    if !ctx.quiet {
        for path in &written {
            ui::dim(&path.display().to_string());
        }
        ui::success(&format!(
            "Exported {} resources to {}",
            written.len(),
            output.display()
        ));
    }
    Ok(())
}
