//! Provider registry - routes declared paths and kinds to providers

use crate::document::as_document;
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::resource::ResourceList;
use serde_json::Value;

/// A boxed provider for type-erased storage
pub type BoxedProvider = Box<dyn Provider>;

/// Providers known to a run, populated once at start-up
#[derive(Default)]
pub struct Registry {
    providers: Vec<BoxedProvider>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider
    ///
    /// Fails if the name is taken or one of its paths is already claimed.
    pub fn register(&mut self, provider: BoxedProvider) -> Result<()> {
        for existing in &self.providers {
            if existing.name() == provider.name() {
                return Err(Error::DuplicateProvider(provider.name().to_string()));
            }
            if let Some(path) = provider
                .json_paths()
                .iter()
                .find(|p| existing.json_paths().contains(p))
            {
                return Err(Error::PathClaimed {
                    path: (*path).to_string(),
                    owner: existing.name().to_string(),
                });
            }
        }
        log::debug!(
            "Registered provider {} for {:?}",
            provider.name(),
            provider.json_paths()
        );
        self.providers.push(provider);
        Ok(())
    }

    /// Builder-style [`Registry::register`]
    pub fn with(mut self, provider: BoxedProvider) -> Result<Self> {
        self.register(provider)?;
        Ok(self)
    }

    /// Look up a provider by kind name
    pub fn get(&self, name: &str) -> Result<&dyn Provider> {
        self.providers
            .iter()
            .find(|p| p.name() == name)
            .map(AsRef::as_ref)
            .ok_or_else(|| Error::UnknownProvider(name.to_string()))
    }

    /// Find the provider claiming a declared top-level path
    pub fn for_path(&self, path: &str) -> Option<&dyn Provider> {
        self.providers
            .iter()
            .find(|p| p.json_paths().contains(&path))
            .map(AsRef::as_ref)
    }

    /// Iterate registered providers in registration order
    pub fn providers(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(AsRef::as_ref)
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Parse a whole declared tree, routing each top-level path to its provider
    ///
    /// Paths no provider claims are skipped.
    pub fn parse(&self, tree: &Value) -> Result<ResourceList> {
        let mut resources = ResourceList::new();

        for (path, subtree) in as_document(tree, "declared resources")? {
            match self.for_path(path) {
                Some(provider) => {
                    let parsed = provider.parse(path, subtree)?;
                    log::debug!(
                        "Parsed {} {} resource(s) from {path}",
                        parsed.len(),
                        provider.name()
                    );
                    resources.merge(parsed)?;
                }
                None => log::warn!("No provider claims '{path}', skipping"),
            }
        }

        Ok(resources)
    }
}
