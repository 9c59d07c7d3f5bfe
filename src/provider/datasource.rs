//! Grafana datasources, keyed by name

use super::{REMOTE_ONLY_FIELDS, fetch, push, segment};
use reconcile::document::{as_document, required_str, strip_fields};
use reconcile::{Format, Provider, Resource, ResourceList, Result};
use restkit::Transport;
use serde_json::Value;
use std::sync::Arc;

const KIND: &str = "datasource";
const PATH: &str = "grafanaDatasources";

/// Datasources on a Grafana instance
pub struct DatasourceProvider {
    transport: Arc<dyn Transport>,
}

impl DatasourceProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    fn write(&self, resource: &Resource) -> Result<()> {
        let body = Format::Json.render(&resource.payload)?;
        push(
            self.transport.as_ref(),
            &resource.uid,
            "api/datasources",
            Format::Json.content_type(),
            &body,
        )?;
        log::info!("Pushed datasource {}", resource.uid);
        Ok(())
    }
}

impl Provider for DatasourceProvider {
    fn name(&self) -> &'static str {
        KIND
    }

    fn json_paths(&self) -> &[&'static str] {
        &[PATH]
    }

    fn format(&self) -> Format {
        Format::Json
    }

    fn parse(&self, path: &str, raw: &Value) -> Result<ResourceList> {
        let entries = as_document(raw, path)?;
        let mut resources = ResourceList::new();

        for (filename, value) in entries {
            let context = format!("{path}.{filename}");
            let payload = as_document(value, &context)?.clone();
            let uid = required_str(&payload, "name", &context)?.to_string();
            let resource = Resource::new(KIND, uid, filename.as_str(), path, payload)
                .map_payload(|p| strip_fields(p, REMOTE_ONLY_FIELDS));
            resources.insert(resource)?;
        }

        Ok(resources)
    }

    fn get_by_uid(&self, uid: &str) -> Result<Resource> {
        let path = format!("api/datasources/name/{}", segment(uid));
        let response = fetch(self.transport.as_ref(), KIND, uid, &path)?;
        let payload = Format::Json.parse(&response.body, &format!("remote datasource {uid}"))?;

        Ok(Resource::new(
            KIND,
            uid,
            uid,
            PATH,
            strip_fields(payload, REMOTE_ONLY_FIELDS),
        ))
    }

    fn add(&self, resource: &Resource) -> Result<()> {
        self.write(resource)
    }

    fn update(&self, _existing: &Resource, resource: &Resource) -> Result<()> {
        self.write(resource)
    }
}
