//! Persist rendered resources to disk
//!
//! Layout: `<dir>/<kind>/<filename>.<ext>`. A filename containing `/`
//! (rule groups are named `<namespace>/<group>`) becomes nested directories.

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::resource::{Resource, ResourceKey, ResourceList};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Relative path a resource is written to
pub fn relative_path(resource: &Resource, extension: &str) -> PathBuf {
    let stem = strip_known_extension(&resource.filename);
    let mut parts: Vec<&str> = stem
        .split('/')
        .filter(|p| !p.is_empty() && *p != "." && *p != "..")
        .collect();
    if parts.is_empty() {
        parts.push(&resource.uid);
    }

    let mut path = PathBuf::from(&resource.kind);
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if i == last {
            path.push(format!("{part}.{extension}"));
        } else {
            path.push(part);
        }
    }
    path
}

fn strip_known_extension(filename: &str) -> &str {
    [".json", ".yaml", ".yml"]
        .iter()
        .find_map(|ext| filename.strip_suffix(ext))
        .unwrap_or(filename)
}

/// Write each resource's canonical representation under `dir`
///
/// Returns the written paths in key order. Target paths are resolved before
/// anything is written; two resources mapping to the same file (`a.json` and
/// `a.yaml`, say) fail with [`Error::ExportCollision`].
pub fn export(registry: &Registry, resources: &ResourceList, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut targets: BTreeMap<PathBuf, ResourceKey> = BTreeMap::new();
    let mut planned = Vec::with_capacity(resources.len());

    for resource in resources {
        let provider = registry.get(&resource.kind)?;
        let path = dir.join(relative_path(resource, provider.extension()));
        if let Some(first) = targets.get(&path) {
            return Err(Error::ExportCollision {
                path,
                first: first.clone(),
                second: resource.key(),
            });
        }
        targets.insert(path.clone(), resource.key());
        planned.push((resource, provider, path));
    }

    let mut written = Vec::with_capacity(planned.len());
    for (resource, provider, path) in planned {
        let content = provider.get_representation(&resource.uid, resource)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&path, ensure_trailing_newline(content)).map_err(|e| Error::io(&path, e))?;
        log::debug!("Wrote {} to {}", resource.key(), path.display());
        written.push(path);
    }

    Ok(written)
}

fn ensure_trailing_newline(mut content: String) -> String {
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}
