//! Backend providers: datasources, dashboards and rule groups
//!
//! Each provider holds the transport for its backend and implements
//! [`reconcile::Provider`]. The HTTP status handling shared by all of them
//! lives here so every kind maps 404, 412 and other failures the same way.

mod dashboard;
mod datasource;
mod rules;

pub use dashboard::DashboardProvider;
pub use datasource::DatasourceProvider;
pub use rules::{DEFAULT_PREFIX as DEFAULT_RULER_PREFIX, RuleGroup, RuleGroupProvider};

use reconcile::{Error, Result};
use restkit::{Response, Transport};
use serde::Deserialize;

/// Fields the backend adds to stored objects that never appear in declarations
pub(crate) const REMOTE_ONLY_FIELDS: &[&str] = &["id", "version"];

/// Body of a backend error response
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ErrorBody {
    fn decode(response: &Response) -> Option<String> {
        serde_json::from_str::<Self>(&response.body)
            .ok()
            .map(|body| body.message)
    }
}

/// GET a single resource, mapping 404 to [`Error::NotFound`]
pub(crate) fn fetch(transport: &dyn Transport, kind: &str, uid: &str, path: &str) -> Result<Response> {
    let response = transport
        .get(path)
        .map_err(|e| Error::transport(format!("fetching {kind}.{uid}: {e}"), None))?;

    match response.status {
        404 => Err(Error::not_found(kind, uid)),
        status if status >= 400 => Err(Error::transport(
            format!("fetching {kind}.{uid}: {}", response.status_line()),
            Some(status),
        )),
        _ => Ok(response),
    }
}

/// POST a rendered resource and interpret the response
///
/// 2xx returns the response. 412 carries the backend's message verbatim as
/// [`Error::Conflict`]; its body must decode or the push fails with
/// [`Error::Decode`]. Any other status names the uid and the status line.
pub(crate) fn push(
    transport: &dyn Transport,
    uid: &str,
    path: &str,
    content_type: &str,
    body: &str,
) -> Result<Response> {
    let response = transport
        .post(path, content_type, body)
        .map_err(|e| Error::transport(format!("pushing {uid}: {e}"), None))?;

    if response.is_success() {
        return Ok(response);
    }

    if response.status == 412 {
        return match ErrorBody::decode(&response) {
            Some(message) => Err(Error::conflict(uid, message)),
            None => Err(Error::decode(
                format!("conflict response for {uid}"),
                &response.body,
            )),
        };
    }

    let mut message = format!("non-200 response pushing {uid}: {}", response.status_line());
    if let Some(detail) = ErrorBody::decode(&response) {
        message.push_str(": ");
        message.push_str(&detail);
    }
    Err(Error::transport(message, Some(response.status)))
}

/// Percent-encode one URL path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
