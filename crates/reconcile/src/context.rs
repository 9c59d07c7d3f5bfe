//! Progress reporting hooks
//!
//! The engine never prints. Callers that want feedback while a run is in
//! flight implement [`ProgressCallback`].

use crate::resource::ResourceKey;
use crate::types::{ApplyStatus, ApplySummary};

/// Progress callback for apply runs
pub trait ProgressCallback: Send {
    /// Called before the first resource is applied
    fn on_batch_start(&mut self, count: usize);

    /// Called when starting to apply a single resource
    ///
    /// Only sequential runs call this; parallel runs report completions only.
    fn on_resource_start(&mut self, key: &ResourceKey);

    /// Called when a resource application completes
    fn on_resource_complete(&mut self, key: &ResourceKey, status: &ApplyStatus);

    /// Called after the last resource
    fn on_batch_complete(&mut self, summary: &ApplySummary);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_start(&mut self, _key: &ResourceKey) {}
    fn on_resource_complete(&mut self, _key: &ResourceKey, _status: &ApplyStatus) {}
    fn on_batch_complete(&mut self, _summary: &ApplySummary) {}
}

/// Callback that records every completed key, in completion order
#[derive(Debug, Default)]
pub struct RecordingProgress {
    /// Keys started
    pub started: Vec<ResourceKey>,
    /// Keys completed, with a short status label
    pub completed: Vec<(ResourceKey, String)>,
    /// Batch sizes announced
    pub batches: Vec<usize>,
}

impl ProgressCallback for RecordingProgress {
    fn on_batch_start(&mut self, count: usize) {
        self.batches.push(count);
    }

    fn on_resource_start(&mut self, key: &ResourceKey) {
        self.started.push(key.clone());
    }

    fn on_resource_complete(&mut self, key: &ResourceKey, status: &ApplyStatus) {
        let label = match status {
            ApplyStatus::Done(outcome) => outcome.to_string(),
            ApplyStatus::Failed(_) => "failed".to_string(),
            ApplyStatus::Skipped { .. } => "skipped".to_string(),
        };
        self.completed.push((key.clone(), label));
    }

    fn on_batch_complete(&mut self, _summary: &ApplySummary) {}
}
