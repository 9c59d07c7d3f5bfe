//! Prometheus alerting and recording rule groups on a Cortex-style ruler
//!
//! Declarations are grouped by namespace:
//!
//! ```yaml
//! prometheusAlerts:
//!   teamA:
//!     groups:
//!       - name: latency
//!         rules: [...]
//! ```
//!
//! Each group becomes one resource whose uid is `<namespace>/<group>`. The
//! namespace addresses the group on the ruler but is not part of its body.

use super::{fetch, push, segment};
use reconcile::document::{Document, into_document};
use reconcile::{Error, Format, Provider, Resource, ResourceList, Result};
use restkit::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const KIND: &str = "rulegroup";
const ALERTS_PATH: &str = "prometheusAlerts";
const RULES_PATH: &str = "prometheusRules";

/// Default ruler API prefix
pub const DEFAULT_PREFIX: &str = "api/v1/rules";

/// One rule group as the ruler stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub name: String,
    /// Owning namespace, taken from the declaration key
    #[serde(default, skip_serializing)]
    pub namespace: String,
    #[serde(default)]
    pub rules: Vec<Value>,
    /// Anything else the ruler understands (`interval`, `limit`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RuleGroup {
    /// `<namespace>/<name>`
    pub fn uid(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    fn from_document(namespace: &str, payload: &Document, context: &str) -> Result<Self> {
        let mut group: Self = serde_json::from_value(Value::Object(payload.clone()))
            .map_err(|e| Error::decode(context, e))?;
        group.namespace = namespace.to_string();
        Ok(group)
    }

    fn into_document(self, context: &str) -> Result<Document> {
        let value = serde_json::to_value(&self).map_err(|e| Error::decode(context, e))?;
        into_document(value, context)
    }
}

#[derive(Debug, Deserialize)]
struct RuleGrouping {
    #[serde(default)]
    groups: Vec<RuleGroup>,
}

/// Split a rule group uid into namespace and group name
pub fn split_uid(uid: &str) -> Result<(&str, &str)> {
    match uid.split_once('/') {
        Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
            Ok((namespace, name))
        }
        _ => Err(Error::decode(
            format!("rule group uid '{uid}'"),
            "expected <namespace>/<group>",
        )),
    }
}

/// Rule groups on a ruler
pub struct RuleGroupProvider {
    transport: Arc<dyn Transport>,
    prefix: String,
}

impl RuleGroupProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    fn write(&self, resource: &Resource) -> Result<()> {
        let (namespace, _) = split_uid(&resource.uid)?;
        let body = Format::Yaml.render(&resource.payload)?;
        let path = format!("{}/{}", self.prefix, segment(namespace));

        push(
            self.transport.as_ref(),
            &resource.uid,
            &path,
            Format::Yaml.content_type(),
            &body,
        )?;
        log::info!("Pushed rule group {}", resource.uid);
        Ok(())
    }
}

impl Provider for RuleGroupProvider {
    fn name(&self) -> &'static str {
        KIND
    }

    fn json_paths(&self) -> &[&'static str] {
        &[ALERTS_PATH, RULES_PATH]
    }

    fn format(&self) -> Format {
        Format::Yaml
    }

    fn parse(&self, path: &str, raw: &Value) -> Result<ResourceList> {
        let groupings: BTreeMap<String, RuleGrouping> =
            serde_json::from_value(raw.clone()).map_err(|e| Error::decode(path, e))?;
        let mut resources = ResourceList::new();

        for (namespace, grouping) in groupings {
            for mut group in grouping.groups {
                let context = format!("{path}.{namespace}");
                if group.name.is_empty() {
                    return Err(Error::decode(context, "rule group without a name"));
                }
                group.namespace.clone_from(&namespace);

                let uid = group.uid();
                let payload = group.into_document(&context)?;
                resources.insert(Resource::new(KIND, uid.clone(), uid, path, payload))?;
            }
        }

        Ok(resources)
    }

    fn get_by_uid(&self, uid: &str) -> Result<Resource> {
        let (namespace, name) = split_uid(uid)?;
        let path = format!("{}/{}/{}", self.prefix, segment(namespace), segment(name));
        let response = fetch(self.transport.as_ref(), KIND, uid, &path)?;

        let context = format!("remote rule group {uid}");
        let raw = Format::Yaml.parse(&response.body, &context)?;
        let payload = RuleGroup::from_document(namespace, &raw, &context)?.into_document(&context)?;

        Ok(Resource::new(KIND, uid, uid, ALERTS_PATH, payload))
    }

    fn add(&self, resource: &Resource) -> Result<()> {
        self.write(resource)
    }

    fn update(&self, _existing: &Resource, resource: &Resource) -> Result<()> {
        self.write(resource)
    }
}
