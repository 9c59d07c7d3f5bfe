use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::cli::SelectArgs;

/// Print each resource in its canonical form
pub fn run(ctx: &Context, select: &SelectArgs) -> Result<()> {
    let (registry, resources) = super::load(ctx, select)?;

    for resource in &resources {
        let provider = registry.get(&resource.kind)?;
        let rendered = provider.get_representation(&resource.uid, resource)?;

        if !ctx.quiet {
            println!("{}", format!("# {}", resource.key()).dimmed());
        }
        println!("{}", rendered.trim_end());
    }
    Ok(())
}
