//! Diff computation between declared and remote renderings

use crate::document::Format;
use crate::error::Result;
use crate::registry::Registry;
use crate::resource::{Resource, ResourceKey, ResourceList};
use similar::TextDiff;
use std::collections::BTreeMap;

/// Declared versus remote rendering of one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDiff {
    /// Resource the diff is about
    pub key: ResourceKey,
    /// Format both renderings are in
    pub format: Format,
    /// Canonical rendering of the declared resource
    pub declared: String,
    /// Canonical rendering of the remote resource, `None` if absent remotely
    pub remote: Option<String>,
}

impl ResourceDiff {
    /// Render a declared resource and its remote counterpart
    pub fn from_resource(registry: &Registry, resource: &Resource) -> Result<Self> {
        let provider = registry.get(&resource.kind)?;
        let declared = provider.get_representation(&resource.uid, resource)?;
        let remote = match provider.get_remote_representation(&resource.uid) {
            Ok(remote) => Some(remote),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            key: resource.key(),
            format: provider.format(),
            declared,
            remote,
        })
    }

    /// Resource does not exist remotely
    pub fn is_addition(&self) -> bool {
        self.remote.is_none()
    }

    /// Resource exists remotely with different content
    pub fn is_modification(&self) -> bool {
        self.remote.as_ref().is_some_and(|r| *r != self.declared)
    }

    /// Whether applying would write to the backend
    pub fn has_changes(&self) -> bool {
        self.is_addition() || self.is_modification()
    }

    /// Unified text diff from remote to declared
    pub fn unified(&self) -> String {
        let remote = self.remote.as_deref().unwrap_or("");
        let diff = TextDiff::from_lines(remote, self.declared.as_str());
        let remote_header = format!("remote/{}", self.key);
        let declared_header = format!("declared/{}", self.key);
        diff.unified_diff()
            .context_radius(3)
            .missing_newline_hint(false)
            .header(&remote_header, &declared_header)
            .to_string()
    }
}

/// Diff result for one resource
#[derive(Debug)]
pub struct DiffReport {
    /// Resource the report is about
    pub key: ResourceKey,
    /// The diff, or why it could not be computed
    pub result: Result<ResourceDiff>,
}

/// Compute diffs for a list of resources, one report per resource
pub fn compute_diffs(registry: &Registry, resources: &ResourceList) -> Vec<DiffReport> {
    resources
        .iter()
        .map(|r| DiffReport {
            key: r.key(),
            result: ResourceDiff::from_resource(registry, r),
        })
        .collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to modify
    pub modifications: usize,
    /// Number of resources already in sync
    pub unchanged: usize,
    /// Number of resources whose diff failed
    pub errors: usize,
}

impl DiffSummary {
    /// Create a summary from a list of reports
    pub fn from_reports(reports: &[DiffReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match &report.result {
                Ok(diff) if diff.is_addition() => summary.additions += 1,
                Ok(diff) if diff.is_modification() => summary.modifications += 1,
                Ok(_) => summary.unchanged += 1,
                Err(_) => summary.errors += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group reports by resource kind
pub fn group_by_kind(reports: &[DiffReport]) -> BTreeMap<&str, Vec<&DiffReport>> {
    let mut groups: BTreeMap<&str, Vec<&DiffReport>> = BTreeMap::new();
    for report in reports {
        groups.entry(report.key.kind.as_str()).or_default().push(report);
    }
    groups
}
