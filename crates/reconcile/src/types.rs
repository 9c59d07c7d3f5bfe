//! Core types for reconciliation outcomes

use crate::error::Error;
use crate::resource::ResourceKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What applying a single resource did to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyOutcome {
    /// Resource was absent remotely and has been created
    Added,
    /// Resource differed remotely and has been pushed
    Updated,
    /// Remote state already matched; nothing was written
    Unchanged,
}

impl ApplyOutcome {
    /// Whether the backend was written to
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Added | Self::Updated)
    }
}

impl fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("added"),
            Self::Updated => f.write_str("updated"),
            Self::Unchanged => f.write_str("unchanged"),
        }
    }
}

/// Final status of one resource in an apply run
#[derive(Debug)]
pub enum ApplyStatus {
    /// Apply completed
    Done(ApplyOutcome),
    /// Apply failed with an error
    Failed(Error),
    /// Apply was not attempted
    Skipped { reason: String },
}

impl ApplyStatus {
    /// Check if the status represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Check if the status represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Done(outcome) if outcome.is_change())
    }
}

impl From<crate::error::Result<ApplyOutcome>> for ApplyStatus {
    fn from(result: crate::error::Result<ApplyOutcome>) -> Self {
        match result {
            Ok(outcome) => Self::Done(outcome),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Per-resource report of an apply run
#[derive(Debug)]
pub struct ApplyReport {
    /// Resource the report is about
    pub key: ResourceKey,
    /// What happened
    pub status: ApplyStatus,
}

/// Result of a successful preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Where the preview can be viewed
    pub url: String,
}

/// Summary of an apply run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ApplySummary {
    /// Build a summary from reports
    pub fn from_reports(reports: &[ApplyReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.add_status(&report.status);
        }
        summary
    }

    /// Total number of backend writes
    pub fn total_changes(&self) -> usize {
        self.added + self.updated
    }

    /// Check if the run was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.added + self.updated + self.unchanged + self.failed + self.skipped
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &ApplySummary) {
        self.added += other.added;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }

    /// Add a status to the summary
    pub fn add_status(&mut self, status: &ApplyStatus) {
        match status {
            ApplyStatus::Done(ApplyOutcome::Added) => self.added += 1,
            ApplyStatus::Done(ApplyOutcome::Updated) => self.updated += 1,
            ApplyStatus::Done(ApplyOutcome::Unchanged) => self.unchanged += 1,
            ApplyStatus::Failed(_) => self.failed += 1,
            ApplyStatus::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for an apply run
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Number of resources applied concurrently; 1 is fully sequential
    pub jobs: usize,
    /// Stop at the first failure and skip the remaining resources
    pub fail_fast: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            fail_fast: false,
        }
    }
}
