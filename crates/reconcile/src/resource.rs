//! Resources and the keyed set they are collected in.
//!
//! A [`Resource`] wraps a provider-specific payload together with the
//! identity the reconciler needs: which provider owns it (`kind`), its
//! unique id within that provider (`uid`), where it was declared
//! (`json_path`) and the name it had in the declared tree (`filename`).

use crate::document::Document;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// Composite identifier of a resource: provider kind plus uid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Provider name.
    pub kind: String,
    /// Unique id within the provider.
    pub uid: String,
}

impl ResourceKey {
    /// Create a new key.
    pub fn new(kind: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            uid: uid.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.uid)
    }
}

/// A declared or remote resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique id derived by the provider.
    pub uid: String,
    /// Name of the resource in its declared tree (or the uid for remote ones).
    pub filename: String,
    /// Owning provider name.
    pub kind: String,
    /// Top-level declared path this resource came from.
    pub json_path: String,
    /// Backend-specific payload.
    pub payload: Document,
}

impl Resource {
    /// Create a new resource.
    pub fn new(
        kind: impl Into<String>,
        uid: impl Into<String>,
        filename: impl Into<String>,
        json_path: impl Into<String>,
        payload: Document,
    ) -> Self {
        Self {
            uid: uid.into(),
            filename: filename.into(),
            kind: kind.into(),
            json_path: json_path.into(),
            payload,
        }
    }

    /// The key this resource is indexed by.
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.kind, &self.uid)
    }

    /// Return the resource with a transformed payload.
    pub fn map_payload(self, f: impl FnOnce(Document) -> Document) -> Self {
        Self {
            payload: f(self.payload),
            ..self
        }
    }
}

/// Resources indexed by key, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceList {
    resources: BTreeMap<ResourceKey, Resource>,
}

impl ResourceList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, rejecting a second resource with the same key.
    pub fn insert(&mut self, resource: Resource) -> Result<()> {
        match self.resources.entry(resource.key()) {
            btree_map::Entry::Occupied(entry) => Err(Error::DuplicateKey(entry.key().clone())),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(resource);
                Ok(())
            }
        }
    }

    /// Move every resource of `other` into this list.
    pub fn merge(&mut self, other: ResourceList) -> Result<()> {
        for resource in other {
            self.insert(resource)?;
        }
        Ok(())
    }

    /// Look up a resource by key.
    pub fn get(&self, key: &ResourceKey) -> Option<&Resource> {
        self.resources.get(key)
    }

    /// Iterate resources in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.resources.keys()
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Keep only resources matching a predicate.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|(_, r)| predicate(r))
                .collect(),
        }
    }

    /// Keep only resources matching a target pattern.
    ///
    /// Target format: "kind" or "kind.uid". The uid part matches as a
    /// substring, so `rulegroup.teamA/` selects a whole namespace.
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (kind, uid) = parse_target(t);
                self.filter(|r| matches_target(r, kind, uid))
            }
        }
    }
}

impl IntoIterator for ResourceList {
    type Item = Resource;
    type IntoIter = btree_map::IntoValues<ResourceKey, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_values()
    }
}

impl<'a> IntoIterator for &'a ResourceList {
    type Item = &'a Resource;
    type IntoIter = btree_map::Values<'a, ResourceKey, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.values()
    }
}

/// Split "kind.uid" at the first dot; uids may contain dots themselves.
fn parse_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('.') {
        Some((kind, uid)) => (kind, Some(uid)),
        None => (target, None),
    }
}

fn matches_target(resource: &Resource, kind: &str, uid: Option<&str>) -> bool {
    if resource.kind != kind {
        return false;
    }
    match uid {
        Some(u) => resource.uid.contains(u),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(kind: &str, uid: &str) -> Resource {
        Resource::new(kind, uid, uid, "test", Document::new())
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ResourceKey::new("datasource", "prom-1").to_string(), "datasource.prom-1");
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let mut list = ResourceList::new();
        list.insert(resource("datasource", "prom-1")).unwrap();

        let err = list.insert(resource("datasource", "prom-1")).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(ref k) if k.uid == "prom-1"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_same_uid_different_kind_is_distinct() {
        let mut list = ResourceList::new();
        list.insert(resource("datasource", "x")).unwrap();
        list.insert(resource("dashboard", "x")).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let mut list = ResourceList::new();
        list.insert(resource("datasource", "b")).unwrap();
        list.insert(resource("dashboard", "z")).unwrap();
        list.insert(resource("datasource", "a")).unwrap();

        let keys: Vec<String> = list.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["dashboard.z", "datasource.a", "datasource.b"]);
    }

    #[test]
    fn test_merge_detects_duplicates() {
        let mut a = ResourceList::new();
        a.insert(resource("rulegroup", "ns/x")).unwrap();
        let mut b = ResourceList::new();
        b.insert(resource("rulegroup", "ns/x")).unwrap();

        assert!(a.merge(b).is_err());
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("datasource"), ("datasource", None));
        assert_eq!(parse_target("datasource.prom"), ("datasource", Some("prom")));
        assert_eq!(
            parse_target("rulegroup.teamA/node.rules"),
            ("rulegroup", Some("teamA/node.rules"))
        );
    }

    #[test]
    fn test_filter_by_target() {
        let mut list = ResourceList::new();
        list.insert(resource("datasource", "prom-1")).unwrap();
        list.insert(resource("datasource", "loki")).unwrap();
        list.insert(resource("dashboard", "prom-overview")).unwrap();

        assert_eq!(list.clone().filter_by_target(None).len(), 3);
        assert_eq!(list.clone().filter_by_target(Some("datasource")).len(), 2);

        let prom = list.filter_by_target(Some("datasource.prom"));
        assert_eq!(prom.len(), 1);
        assert!(prom.get(&ResourceKey::new("datasource", "prom-1")).is_some());
    }
}
