use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::cli::SelectArgs;
use crate::ui;

pub fn run(ctx: &Context, select: &SelectArgs) -> Result<()> {
    let (_, resources) = super::load(ctx, select)?;

    if resources.is_empty() {
        ui::warn("No declared resources matched");
        return Ok(());
    }

    if ctx.quiet {
        for key in resources.keys() {
            println!("{key}");
        }
        return Ok(());
    }

    ui::header(&format!("Declared Resources ({})", resources.len()));
    for resource in &resources {
        println!(
            "  {:<12} {:<40} {}",
            resource.kind.cyan(),
            resource.uid,
            format!("{}.{}", resource.json_path, resource.filename).dimmed()
        );
    }
    Ok(())
}
