use anyhow::{Context as _, Result};

use crate::Context;

/// Fetch one resource from its backend and print it
pub fn run(ctx: &Context, kind: &str, uid: &str) -> Result<()> {
    let registry = ctx.config.registry()?;
    let provider = registry.get(kind)?;
    let rendered = provider
        .get_remote_representation(uid)
        .with_context(|| format!("Could not get {kind}.{uid}"))?;

    println!("{}", rendered.trim_end());
    Ok(())
}
