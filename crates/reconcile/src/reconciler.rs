//! Reconciliation driver - applies declared resources one provider call at a time

use crate::context::{NoProgress, ProgressCallback};
use crate::diff::{DiffReport, compute_diffs};
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::resource::{Resource, ResourceKey, ResourceList};
use crate::types::{ApplyOptions, ApplyReport, ApplyStatus, ApplySummary, Preview};
use rayon::prelude::*;

/// Preview result for one resource
#[derive(Debug)]
pub struct PreviewReport {
    /// Resource the report is about
    pub key: ResourceKey,
    /// Preview location, or why there is none
    pub result: Result<Preview>,
}

/// Drives apply, diff and preview over a declared resource set
pub struct Reconciler<'a> {
    registry: &'a Registry,
    options: ApplyOptions,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler with default (sequential) options
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            options: ApplyOptions::default(),
        }
    }

    /// Replace the apply options
    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    /// The registry this reconciler resolves providers from
    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Apply every resource, reporting one status per resource in key order
    ///
    /// A failing resource never prevents the others from being applied,
    /// unless `fail_fast` is set.
    pub fn apply<P: ProgressCallback>(
        &self,
        resources: &ResourceList,
        progress: &mut P,
    ) -> Result<Vec<ApplyReport>> {
        progress.on_batch_start(resources.len());

        let reports = if self.options.jobs <= 1 || self.options.fail_fast || resources.len() <= 1 {
            self.apply_sequential(resources, progress)
        } else {
            self.apply_parallel(resources, progress)?
        };

        let summary = ApplySummary::from_reports(&reports);
        log::info!(
            "Apply finished: {} added, {} updated, {} unchanged, {} failed",
            summary.added,
            summary.updated,
            summary.unchanged,
            summary.failed
        );
        progress.on_batch_complete(&summary);
        Ok(reports)
    }

    fn apply_sequential<P: ProgressCallback>(
        &self,
        resources: &ResourceList,
        progress: &mut P,
    ) -> Vec<ApplyReport> {
        let mut reports = Vec::with_capacity(resources.len());
        let mut aborted = false;

        for resource in resources {
            let key = resource.key();
            let status = if aborted {
                ApplyStatus::Skipped {
                    reason: "an earlier resource failed".to_string(),
                }
            } else {
                progress.on_resource_start(&key);
                apply_one(self.registry, resource)
            };

            if self.options.fail_fast && !status.is_success() {
                aborted = true;
            }
            progress.on_resource_complete(&key, &status);
            reports.push(ApplyReport { key, status });
        }

        reports
    }

    /// Fan out across resources; results are reported after the pool finishes
    ///
    /// Progress is batch-level here: `on_resource_start` is not called, and
    /// every `on_resource_complete` fires in key order once all are done.
    fn apply_parallel<P: ProgressCallback>(
        &self,
        resources: &ResourceList,
        progress: &mut P,
    ) -> Result<Vec<ApplyReport>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        let items: Vec<&Resource> = resources.iter().collect();
        let statuses: Vec<ApplyStatus> = pool.install(|| {
            items
                .par_iter()
                .map(|resource| apply_one(self.registry, resource))
                .collect()
        });

        let reports: Vec<ApplyReport> = items
            .iter()
            .zip(statuses)
            .map(|(resource, status)| ApplyReport {
                key: resource.key(),
                status,
            })
            .collect();

        for report in &reports {
            progress.on_resource_complete(&report.key, &report.status);
        }

        Ok(reports)
    }

    /// Compare every declared resource with its remote counterpart without writing
    pub fn diff(&self, resources: &ResourceList) -> Vec<DiffReport> {
        compute_diffs(self.registry, resources)
    }

    /// Push every resource to its provider's preview environment
    pub fn preview(&self, resources: &ResourceList) -> Vec<PreviewReport> {
        resources
            .iter()
            .map(|resource| PreviewReport {
                key: resource.key(),
                result: self
                    .registry
                    .get(&resource.kind)
                    .and_then(|provider| provider.preview(resource)),
            })
            .collect()
    }
}

/// Apply a single resource through its provider
fn apply_one(registry: &Registry, resource: &Resource) -> ApplyStatus {
    let status: ApplyStatus = registry
        .get(&resource.kind)
        .and_then(|provider| provider.apply(resource))
        .into();

    match &status {
        ApplyStatus::Done(outcome) => log::debug!("{} {outcome}", resource.key()),
        ApplyStatus::Failed(e) => log::debug!("{} failed: {e}", resource.key()),
        ApplyStatus::Skipped { reason } => log::debug!("{} skipped: {reason}", resource.key()),
    }
    status
}

/// Simple apply without progress reporting
pub fn apply(
    registry: &Registry,
    resources: &ResourceList,
    options: ApplyOptions,
) -> Result<Vec<ApplyReport>> {
    Reconciler::new(registry)
        .with_options(options)
        .apply(resources, &mut NoProgress)
}
