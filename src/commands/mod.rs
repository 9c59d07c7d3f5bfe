//! Command implementations
//!
//! Every command that reads declarations goes through [`load`], which
//! builds the registry from config and parses the declared tree.

pub mod apply;
pub mod diff;
pub mod export;
pub mod get;
pub mod list;
pub mod preview;
pub mod providers;
pub mod show;

use anyhow::Result;
use reconcile::{Registry, ResourceList};

use crate::Context;
use crate::cli::SelectArgs;
use crate::declared;

/// Build the registry and parse the selected declared resources
pub fn load(ctx: &Context, select: &SelectArgs) -> Result<(Registry, ResourceList)> {
    let registry = ctx.config.registry()?;
    let tree = declared::load(&select.inputs)?;
    let resources = registry
        .parse(&tree)?
        .filter_by_target(select.target.as_deref());

    log::info!("{} declared resources selected", resources.len());
    Ok((registry, resources))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_load_parses_all_kinds() {
        let (_dir, select) = select(DECLARED, None);
        let (registry, resources) = load(&context(), &select).unwrap();

        assert_eq!(registry.len(), 3);
        let keys: Vec<String> = resources.keys().map(ToString::to_string).collect();
        assert_eq!(
            keys,
            vec!["dashboard.abc", "datasource.prom-1", "rulegroup.teamA/latency"]
        );
    }

    #[test]
    fn test_load_applies_target() {
        let (_dir, select) = select(DECLARED, Some("rulegroup"));
        let (_, resources) = load(&context(), &select).unwrap();
        assert_eq!(resources.len(), 1);
    }

    #[test]
    fn test_load_skips_unclaimed_paths() {
        let (_dir, select) = select(r#"{"somethingElse": {"x": {}}}"#, None);
        let (_, resources) = load(&context(), &select).unwrap();
        assert!(resources.is_empty());
    }
}
