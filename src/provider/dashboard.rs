//! Grafana dashboards, keyed by their `uid` field
//!
//! The stored form is the bare dashboard model. Folder placement and the
//! overwrite flag only exist in the write envelope built by [`DashboardProvider::envelope`].

use super::{REMOTE_ONLY_FIELDS, fetch, push, segment};
use reconcile::document::{Document, as_document, into_document, required_str, strip_fields};
use reconcile::{Error, Format, Preview, Provider, Resource, ResourceList, Result};
use restkit::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const KIND: &str = "dashboard";
const PATH: &str = "grafanaDashboards";

/// Body of `GET api/dashboards/uid/{uid}`
#[derive(Debug, Deserialize)]
struct DashboardWithMeta {
    dashboard: Value,
}

/// Write envelope for `POST api/dashboards/db`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardEnvelope<'a> {
    dashboard: &'a Document,
    folder_id: i64,
    overwrite: bool,
}

/// Request body for `POST api/snapshots`
#[derive(Debug, Serialize)]
struct SnapshotRequest<'a> {
    dashboard: &'a Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    url: String,
}

/// Dashboards on a Grafana instance
pub struct DashboardProvider {
    transport: Arc<dyn Transport>,
    folder_id: i64,
    snapshot_expires: Option<u64>,
}

impl DashboardProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            folder_id: 0,
            snapshot_expires: None,
        }
    }

    /// Folder new and updated dashboards are placed in (0 is General)
    #[must_use]
    pub fn with_folder(mut self, folder_id: i64) -> Self {
        self.folder_id = folder_id;
        self
    }

    /// Lifetime of preview snapshots in seconds; unset means they never expire
    #[must_use]
    pub fn with_snapshot_expiry(mut self, seconds: Option<u64>) -> Self {
        self.snapshot_expires = seconds;
        self
    }

    fn envelope(&self, resource: &Resource) -> Result<String> {
        let envelope = DashboardEnvelope {
            dashboard: &resource.payload,
            folder_id: self.folder_id,
            overwrite: true,
        };
        serde_json::to_string_pretty(&envelope)
            .map_err(|e| Error::decode(format!("dashboard envelope for {}", resource.uid), e))
    }

    fn write(&self, resource: &Resource) -> Result<()> {
        let body = self.envelope(resource)?;
        push(
            self.transport.as_ref(),
            &resource.uid,
            "api/dashboards/db",
            Format::Json.content_type(),
            &body,
        )?;
        log::info!("Pushed dashboard {}", resource.uid);
        Ok(())
    }
}

impl Provider for DashboardProvider {
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
            let uid = required_str(&payload, "uid", &context)?.to_string();
            let resource = Resource::new(KIND, uid, filename.as_str(), path, payload)
                .map_payload(|p| strip_fields(p, REMOTE_ONLY_FIELDS));
            resources.insert(resource)?;
        }

        Ok(resources)
    }

    fn get_by_uid(&self, uid: &str) -> Result<Resource> {
        let path = format!("api/dashboards/uid/{}", segment(uid));
        let response = fetch(self.transport.as_ref(), KIND, uid, &path)?;
        let context = format!("remote dashboard {uid}");

        let body: DashboardWithMeta =
            serde_json::from_str(&response.body).map_err(|e| Error::decode(&context, e))?;
        let payload = into_document(body.dashboard, &context)?;

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

    fn preview(&self, resource: &Resource) -> Result<Preview> {
        let request = SnapshotRequest {
            dashboard: &resource.payload,
            expires: self.snapshot_expires,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| Error::decode(format!("snapshot request for {}", resource.uid), e))?;

        let response = push(
            self.transport.as_ref(),
            &resource.uid,
            "api/snapshots",
            Format::Json.content_type(),
            &body,
        )?;
        let snapshot: SnapshotResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::decode(format!("snapshot response for {}", resource.uid), e))?;

        log::debug!("Snapshot of {} at {}", resource.uid, snapshot.url);
        Ok(Preview { url: snapshot.url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{ApplyOutcome, ErrorCategory};
    use restkit::{MockTransport, Response};
    use serde_json::json;

    fn declared() -> Value {
        json!({"overview.json": {"uid": "abc", "title": "Overview", "panels": []}})
    }

    fn setup() -> (Arc<MockTransport>, DashboardProvider) {
        let mock = Arc::new(MockTransport::new());
        let provider = DashboardProvider::new(mock.clone()).with_folder(12);
        (mock, provider)
    }

    fn first(resources: &ResourceList) -> &Resource {
        resources.iter().next().unwrap()
    }

    #[test]
    fn test_parse_keys_by_uid() {
        let (_, provider) = setup();
        let resources = provider.parse(PATH, &declared()).unwrap();
        let resource = first(&resources);

        assert_eq!(resource.uid, "abc");
        assert_eq!(resource.key().to_string(), "dashboard.abc");
    }

    #[test]
    fn test_add_wraps_in_envelope() {
        let (mock, provider) = setup();
        let resources = provider.parse(PATH, &declared()).unwrap();

        assert_eq!(provider.apply(first(&resources)).unwrap(), ApplyOutcome::Added);

        let posts = mock.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, "api/dashboards/db");
        let body: Value = serde_json::from_str(posts[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["folderId"], 12);
        assert_eq!(body["overwrite"], true);
        assert_eq!(body["dashboard"]["uid"], "abc");
    }

    #[test]
    fn test_envelope_not_part_of_representation() {
        let (_, provider) = setup();
        let resources = provider.parse(PATH, &declared()).unwrap();
        let rendered = provider.get_representation("abc", first(&resources)).unwrap();

        assert!(!rendered.contains("folderId"));
        assert!(!rendered.contains("overwrite"));
    }

    #[test]
    fn test_remote_unwrapped_and_stripped_matches_declared() {
        let (mock, provider) = setup();
        mock.on_get(
            "api/dashboards/uid/abc",
            Response::new(
                200,
                r#"{"meta":{"slug":"overview"},"dashboard":{"id":41,"version":9,"panels":[],"title":"Overview","uid":"abc"}}"#,
            ),
        );
        let resources = provider.parse(PATH, &declared()).unwrap();

        assert_eq!(
            provider.get_remote_representation("abc").unwrap(),
            provider.get_representation("abc", first(&resources)).unwrap()
        );
        assert_eq!(provider.apply(first(&resources)).unwrap(), ApplyOutcome::Unchanged);
        assert!(mock.posts().is_empty());
    }

    #[test]
    fn test_update_conflict_surfaces_message() {
        let (mock, provider) = setup();
        mock.on_get(
            "api/dashboards/uid/abc",
            Response::new(200, r#"{"dashboard":{"uid":"abc","title":"Old"}}"#),
        );
        mock.on_post(
            "api/dashboards/db",
            Response::new(412, r#"{"message":"version mismatch"}"#),
        );
        let resources = provider.parse(PATH, &declared()).unwrap();

        let err = provider.apply(first(&resources)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert!(err.to_string().contains("version mismatch"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_remote_without_dashboard_field_is_decode_error() {
        let (mock, provider) = setup();
        mock.on_get("api/dashboards/uid/abc", Response::new(200, r#"{"meta":{}}"#));

        let err = provider.get_by_uid("abc").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Decode);
    }

    #[test]
    fn test_preview_posts_snapshot() {
        let (mock, provider) = setup();
        let provider = provider.with_snapshot_expiry(Some(3600));
        mock.on_post(
            "api/snapshots",
            Response::new(200, r#"{"key":"k1","url":"http://grafana/dashboard/snapshot/k1"}"#),
        );
        let resources = provider.parse(PATH, &declared()).unwrap();

        let preview = provider.preview(first(&resources)).unwrap();
        assert_eq!(preview.url, "http://grafana/dashboard/snapshot/k1");

        let posts = mock.posts();
        let body: Value = serde_json::from_str(posts[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["expires"], 3600);
        assert_eq!(body["dashboard"]["uid"], "abc");
    }

    #[test]
    fn test_preview_omits_expiry_when_unset() {
        let (mock, provider) = setup();
        mock.on_post("api/snapshots", Response::new(200, r#"{"url":"http://s"}"#));
        let resources = provider.parse(PATH, &declared()).unwrap();

        provider.preview(first(&resources)).unwrap();
        let body = mock.posts()[0].body.clone().unwrap();
        assert!(!body.contains("expires"));
    }

    #[test]
    fn test_declared_null_id_stays_idempotent() {
        let (mock, provider) = setup();
        mock.on_get(
            "api/dashboards/uid/abc",
            Response::new(
                200,
                r#"{"dashboard":{"id":41,"version":3,"uid":"abc","title":"x"}}"#,
            ),
        );
        let resources = provider
            .parse(PATH, &json!({"x.json": {"uid": "abc", "id": null, "version": 1, "title": "x"}}))
            .unwrap();
        let resource = first(&resources);

        assert_eq!(provider.apply(resource).unwrap(), ApplyOutcome::Unchanged);
        assert_eq!(provider.apply(resource).unwrap(), ApplyOutcome::Unchanged);
        assert!(mock.posts().is_empty());
    }

    #[test]
    fn test_pushed_dashboard_has_no_declared_id() {
        let (mock, provider) = setup();
        let resources = provider
            .parse(PATH, &json!({"x.json": {"uid": "abc", "id": 5, "title": "x"}}))
            .unwrap();

        provider.apply(first(&resources)).unwrap();
        let body: Value = serde_json::from_str(mock.posts()[0].body.as_deref().unwrap()).unwrap();
        assert!(body["dashboard"].get("id").is_none());
    }
}
