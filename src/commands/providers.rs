use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::ui;

/// List registered providers with their declared paths and format
pub fn run(ctx: &Context) -> Result<()> {
    let registry = ctx.config.registry()?;

    ui::header("Providers");
    for provider in registry.providers() {
        println!(
            "  {:<12} {:<5} {}",
            provider.name().cyan(),
            provider.extension(),
            provider.json_paths().join(", ").dimmed()
        );
    }

    println!();
    let grafana = ctx.config.grafana.url.as_deref().unwrap_or("(not set)");
    let ruler = ctx.config.ruler.url.as_deref().unwrap_or("(not set)");
    ui::kv("grafana", grafana);
    ui::kv("ruler", ruler);
    Ok(())
}
