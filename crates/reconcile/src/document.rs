//! Opaque payload documents and their canonical renderings.
//!
//! Payloads are schema-free string-keyed maps. Keys are kept sorted, so two
//! documents with the same content always render to the same bytes no matter
//! in which order a backend returned the fields.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A backend-specific payload.
pub type Document = serde_json::Map<String, Value>;

/// Serialization format a provider renders its resources in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Pretty JSON with two-space indentation.
    Json,
    /// YAML.
    Yaml,
}

impl Format {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// MIME type used when pushing a body in this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
        }
    }

    /// Render a document canonically.
    pub fn render(&self, document: &Document) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(document)
                .map_err(|e| Error::decode("document as JSON", e)),
            Self::Yaml => {
                serde_yaml::to_string(document).map_err(|e| Error::decode("document as YAML", e))
            }
        }
    }

    /// Parse text in this format into a document.
    pub fn parse(&self, text: &str, context: &str) -> Result<Document> {
        let value: Value = match self {
            Self::Json => serde_json::from_str(text).map_err(|e| Error::decode(context, e))?,
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| Error::decode(context, e))?,
        };
        into_document(value, context)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Require a value to be an object.
pub fn into_document(value: Value, context: &str) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::decode(
            context,
            format!("expected an object, found {}", type_name(&other)),
        )),
    }
}

/// Require a value to be an object, borrowing it.
pub fn as_document<'a>(value: &'a Value, context: &str) -> Result<&'a Document> {
    value.as_object().ok_or_else(|| {
        Error::decode(
            context,
            format!("expected an object, found {}", type_name(value)),
        )
    })
}

/// Read a required string field, typically the uid.
pub fn required_str<'a>(document: &'a Document, field: &str, context: &str) -> Result<&'a str> {
    match document.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(Error::decode(context, format!("field '{field}' is empty"))),
        Some(other) => Err(Error::decode(
            context,
            format!("field '{field}' must be a string, found {}", type_name(other)),
        )),
        None => Err(Error::decode(context, format!("missing field '{field}'"))),
    }
}

/// Remove the given top-level fields.
pub fn strip_fields(mut document: Document, fields: &[&str]) -> Document {
    for field in fields {
        document.remove(*field);
    }
    document
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        into_document(value, "test").unwrap()
    }

    #[test]
    fn test_json_render_is_key_order_independent() {
        let a = doc(json!({"name": "prom-1", "type": "prometheus", "url": "http://x"}));
        let b = doc(json!({"url": "http://x", "type": "prometheus", "name": "prom-1"}));

        assert_eq!(
            Format::Json.render(&a).unwrap(),
            Format::Json.render(&b).unwrap()
        );
    }

    #[test]
    fn test_json_render_uses_two_space_indent() {
        let rendered = Format::Json.render(&doc(json!({"name": "x"}))).unwrap();
        assert_eq!(rendered, "{\n  \"name\": \"x\"\n}");
    }

    #[test]
    fn test_yaml_render() {
        let rendered = Format::Yaml
            .render(&doc(json!({"name": "latency", "rules": []})))
            .unwrap();
        assert_eq!(rendered, "name: latency\nrules: []\n");
    }

    #[test]
    fn test_parse_yaml_document() {
        let parsed = Format::Yaml
            .parse("name: latency\ninterval: 1m\n", "rule group")
            .unwrap();
        assert_eq!(parsed.get("interval"), Some(&json!("1m")));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Format::Json.parse("[1, 2]", "datasource").unwrap_err();
        assert!(err.to_string().contains("expected an object, found an array"));
    }

    #[test]
    fn test_required_str() {
        let d = doc(json!({"name": "prom-1", "id": 3, "empty": ""}));
        assert_eq!(required_str(&d, "name", "ds").unwrap(), "prom-1");
        assert!(required_str(&d, "id", "ds").is_err());
        assert!(required_str(&d, "empty", "ds").is_err());
        assert!(required_str(&d, "uid", "ds").unwrap_err().to_string().contains("missing field 'uid'"));
    }

    #[test]
    fn test_strip_fields() {
        let d = strip_fields(doc(json!({"id": 1, "version": 4, "uid": "abc"})), &["id", "version"]);
        assert_eq!(d.len(), 1);
        assert!(d.contains_key("uid"));
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(Format::Json.extension(), "json");
        assert_eq!(Format::Yaml.extension(), "yaml");
        assert_eq!(Format::Yaml.content_type(), "application/yaml");
        assert_eq!(Format::Json.to_string(), "json");
    }
}
