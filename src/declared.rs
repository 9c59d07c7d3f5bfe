//! Loading the declared tree produced by the templating pipeline
//!
//! Inputs are files, directories or `-` for stdin. Each document is a map of
//! declared path (`grafanaDashboards`, ...) to a map of name to raw object.
//! Documents are merged per path; a name declared twice under the same path
//! is rejected.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Load and merge all inputs into one declared tree
pub fn load(inputs: &[PathBuf]) -> Result<Value> {
    let mut tree = Map::new();

    for input in inputs {
        if input.as_os_str() == "-" {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Could not read stdin")?;
            merge(&mut tree, parse(&content, None, "<stdin>")?, "<stdin>")?;
            continue;
        }

        for file in collect_files(input)? {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Could not read {}", file.display()))?;
            let source = file.display().to_string();
            merge(&mut tree, parse(&content, Some(&file), &source)?, &source)?;
        }
    }

    Ok(Value::Object(tree))
}

/// Files under an input, sorted; a plain file is returned as is
fn collect_files(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        bail!("Input not found: {}", input.display());
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Could not walk {}", input.display()))?;
        if entry.file_type().is_file() && has_known_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    log::debug!("{} declared files under {}", files.len(), input.display());
    Ok(files)
}

fn has_known_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.contains(&e))
}

/// Parse one document; JSON files as JSON, everything else as YAML
fn parse(content: &str, path: Option<&Path>, source: &str) -> Result<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    let is_json = path
        .and_then(Path::extension)
        .is_some_and(|e| e == "json");

    let value: Value = if is_json {
        serde_json::from_str(content).with_context(|| format!("Invalid JSON in {source}"))?
    } else {
        // YAML is a superset of JSON, so stdin may be either
        serde_yaml::from_str(content).with_context(|| format!("Invalid YAML in {source}"))?
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => bail!("{source}: top level must be a mapping of declared paths"),
    }
}

fn merge(tree: &mut Map<String, Value>, document: Map<String, Value>, source: &str) -> Result<()> {
    for (path, entries) in document {
        let Value::Object(entries) = entries else {
            bail!("{source}: '{path}' must be a mapping of names to objects");
        };

        let Value::Object(existing) = tree
            .entry(path.clone())
            .or_insert_with(|| Value::Object(Map::new()))
        else {
            bail!("{source}: '{path}' is not a mapping");
        };

        for (name, raw) in entries {
            if existing.contains_key(&name) {
                bail!("{source}: '{path}.{name}' is already declared");
            }
            existing.insert(name, raw);
        }
    }
    Ok(())
}
