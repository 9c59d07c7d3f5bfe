//! Provider trait: one implementation per resource kind
//!
//! A provider knows how to turn a declared sub-tree into resources, how to
//! read a resource back from the backend, how to render it canonically and
//! how to push it. The create-or-update decision itself is shared by every
//! provider through [`apply_resource`].

use crate::document::Format;
use crate::error::{Error, Result};
use crate::resource::{Resource, ResourceList};
use crate::types::{ApplyOutcome, Preview};
use serde_json::Value;

/// Capability interface implemented by each resource kind
///
/// # Example
///
/// ```ignore
/// use reconcile::{Format, Provider, Resource, ResourceList, Result};
///
/// struct FolderProvider { /* transport */ }
///
/// impl Provider for FolderProvider {
///     fn name(&self) -> &'static str { "folder" }
///     fn json_paths(&self) -> &[&'static str] { &["grafanaFolders"] }
///     fn format(&self) -> Format { Format::Json }
///     fn parse(&self, path: &str, raw: &serde_json::Value) -> Result<ResourceList> { /* ... */ }
///     fn get_by_uid(&self, uid: &str) -> Result<Resource> { /* ... */ }
///     fn add(&self, resource: &Resource) -> Result<()> { /* ... */ }
///     fn update(&self, existing: &Resource, resource: &Resource) -> Result<()> { /* ... */ }
/// }
/// ```
pub trait Provider: Send + Sync {
    /// Stable kind identifier, used in resource keys and target selection
    fn name(&self) -> &'static str;

    /// Top-level declared paths this provider consumes
    ///
    /// A provider may claim several paths (alerts and recording rules, say);
    /// a path is claimed by at most one provider.
    fn json_paths(&self) -> &[&'static str];

    /// Format resources are rendered and persisted in
    fn format(&self) -> Format;

    /// File extension matching [`Provider::format`]
    fn extension(&self) -> &'static str {
        self.format().extension()
    }

    /// Decode a declared sub-tree (a map of name to raw object) into resources
    ///
    /// Fails with [`Error::Decode`] when the shape does not match this kind.
    fn parse(&self, path: &str, raw: &Value) -> Result<ResourceList>;

    /// Fetch the current remote state of a resource
    ///
    /// Returns [`Error::NotFound`] when the backend does not have it. The
    /// returned resource has remote-only fields already stripped.
    fn get_by_uid(&self, uid: &str) -> Result<Resource>;

    /// Render a resource deterministically in this provider's format
    fn get_representation(&self, _uid: &str, resource: &Resource) -> Result<String> {
        self.format().render(&resource.payload)
    }

    /// Fetch and render the remote state, comparable with [`Provider::get_representation`]
    fn get_remote_representation(&self, uid: &str) -> Result<String> {
        let remote = self.get_by_uid(uid)?;
        self.get_representation(uid, &remote)
    }

    /// Create the resource on the backend
    fn add(&self, resource: &Resource) -> Result<()>;

    /// Overwrite an existing remote resource with the declared one
    fn update(&self, existing: &Resource, resource: &Resource) -> Result<()>;

    /// Create-or-update the resource
    fn apply(&self, resource: &Resource) -> Result<ApplyOutcome> {
        apply_resource(self, resource)
    }

    /// Push the resource to a preview environment
    ///
    /// Providers without preview support keep this default, which reports
    /// [`Error::NotImplemented`].
    fn preview(&self, _resource: &Resource) -> Result<Preview> {
        Err(Error::not_implemented(self.name(), "preview"))
    }
}

/// The create-or-update decision shared by all providers
///
/// 1. Look the resource up remotely by uid.
/// 2. Not found: create it.
/// 3. Found: compare canonical renderings and push only if they differ.
/// 4. Any other lookup error aborts this resource before writing.
pub fn apply_resource<P: Provider + ?Sized>(provider: &P, resource: &Resource) -> Result<ApplyOutcome> {
    let uid = resource.uid.as_str();

    match provider.get_by_uid(uid) {
        Err(Error::NotFound { .. }) => {
            log::debug!("{}.{uid} absent remotely, creating", provider.name());
            provider.add(resource)?;
            Ok(ApplyOutcome::Added)
        }
        Ok(existing) => {
            let declared = provider.get_representation(uid, resource)?;
            let remote = provider.get_representation(uid, &existing)?;

            if declared == remote {
                log::debug!("{}.{uid} matches remote state", provider.name());
                return Ok(ApplyOutcome::Unchanged);
            }

            log::debug!("{}.{uid} differs from remote state, updating", provider.name());
            provider.update(&existing, resource)?;
            Ok(ApplyOutcome::Updated)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory provider used by the engine's tests

    use super::*;
    use crate::document::{Document, as_document, into_document, required_str};
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    /// Provider storing remote state in a map keyed by `name`
    #[derive(Default)]
    pub struct MemoryProvider {
        pub remote: Mutex<BTreeMap<String, Document>>,
        pub writes: Mutex<Vec<String>>,
        pub broken: Mutex<HashSet<String>>,
    }

    impl MemoryProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_remote(self, uid: &str, payload: Value) -> Self {
            self.remote
                .lock()
                .unwrap()
                .insert(uid.to_string(), into_document(payload, "test").unwrap());
            self
        }

        pub fn with_broken(self, uid: &str) -> Self {
            self.broken.lock().unwrap().insert(uid.to_string());
            self
        }

        pub fn write_count(&self) -> usize {
            self.writes.lock().unwrap().len()
        }

        fn store(&self, resource: &Resource) {
            self.writes.lock().unwrap().push(resource.uid.clone());
            self.remote
                .lock()
                .unwrap()
                .insert(resource.uid.clone(), resource.payload.clone());
        }
    }

    impl Provider for MemoryProvider {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn json_paths(&self) -> &[&'static str] {
            &["memoryItems"]
        }

        fn format(&self) -> Format {
            Format::Json
        }

        fn parse(&self, path: &str, raw: &Value) -> Result<ResourceList> {
            let mut list = ResourceList::new();
            for (name, item) in as_document(raw, path)? {
                let payload = as_document(item, name)?.clone();
                let uid = required_str(&payload, "name", name)?.to_string();
                list.insert(Resource::new(self.name(), uid, name, path, payload))?;
            }
            Ok(list)
        }

        fn get_by_uid(&self, uid: &str) -> Result<Resource> {
            if self.broken.lock().unwrap().contains(uid) {
                return Err(Error::transport(format!("failed to retrieve memory '{uid}': 500"), Some(500)));
            }
            let remote = self.remote.lock().unwrap();
            let payload = remote
                .get(uid)
                .cloned()
                .ok_or_else(|| Error::not_found(self.name(), uid))?;
            Ok(Resource::new(self.name(), uid, uid, "memoryItems", payload))
        }

        fn add(&self, resource: &Resource) -> Result<()> {
            self.store(resource);
            Ok(())
        }

        fn update(&self, _existing: &Resource, resource: &Resource) -> Result<()> {
            self.store(resource);
            Ok(())
        }
    }

    pub fn declared(uid: &str, value: Value) -> Resource {
        Resource::new("memory", uid, uid, "memoryItems", into_document(value, "test").unwrap())
    }
}
