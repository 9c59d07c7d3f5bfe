//! # Reconcile
//!
//! A framework for reconciling declared resources against a remote store.
//!
//! This crate provides the core abstractions for parsing declared resources,
//! fetching their remote counterparts, detecting changes and pushing only
//! what differs.
//!
//! ## Core Concepts
//!
//! - **Resource**: A provider-tagged payload plus the uid, filename and
//!   declared path it came from
//! - **ResourceKey**: `(kind, uid)`, unique within a declared set
//! - **Provider**: One implementation per resource kind; parses, fetches,
//!   renders and pushes
//! - **Registry**: Routes declared paths and kind names to providers
//! - **Reconciler**: Applies, diffs and previews a resource set
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{ApplyOptions, Reconciler, Registry, NoProgress};
//!
//! let registry = Registry::new()
//!     .with(Box::new(DatasourceProvider::new(transport)))?;
//!
//! // Declared tree produced by the templating pipeline
//! let tree = serde_json::json!({
//!     "grafanaDatasources": {
//!         "prom.json": {"name": "prom-1", "type": "prometheus", "url": "http://x"}
//!     }
//! });
//! let resources = registry.parse(&tree)?;
//!
//! let reports = Reconciler::new(&registry)
//!     .with_options(ApplyOptions::default())
//!     .apply(&resources, &mut NoProgress)?;
//! ```
//!
//! ## Apply semantics
//!
//! For every resource the provider looks the uid up remotely. A miss creates
//! it, a hit compares canonical renderings and pushes only when they differ.
//! Running apply twice without declared changes performs no second write.

pub mod context;
pub mod diff;
pub mod document;
pub mod error;
pub mod export;
pub mod provider;
pub mod reconciler;
pub mod registry;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{NoProgress, ProgressCallback, RecordingProgress};
pub use diff::{DiffReport, DiffSummary, ResourceDiff, compute_diffs, group_by_kind};
pub use document::{Document, Format};
pub use error::{Error, ErrorCategory, Result};
pub use export::export;
pub use provider::{Provider, apply_resource};
pub use reconciler::{PreviewReport, Reconciler, apply};
pub use registry::{BoxedProvider, Registry};
pub use resource::{Resource, ResourceKey, ResourceList};
pub use types::{ApplyOptions, ApplyOutcome, ApplyReport, ApplyStatus, ApplySummary, Preview};
