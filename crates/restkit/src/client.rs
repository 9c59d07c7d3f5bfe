//! Transport trait and the `ureq`-backed client.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

/// Credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: Basic base64(<username>:<password>)`
    Basic {
        /// User name (or tenant id for multi-tenant rulers).
        username: String,
        /// Password or API key.
        password: String,
    },
}

impl Auth {
    /// Value of the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
        }
    }
}

// Credentials never end up in logs.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer(***)"),
            Self::Basic { username, .. } => write!(f, "Basic({username}:***)"),
        }
    }
}

/// Base URL plus the credentials and headers every request carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    auth: Option<Auth>,
    headers: Vec<(String, String)>,
}

impl Endpoint {
    /// Create an endpoint for a base URL such as `https://grafana.example.com`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: None,
            headers: Vec::new(),
        }
    }

    /// Attach credentials.
    #[must_use]
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Attach an extra header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured credentials.
    #[must_use]
    pub fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    /// Extra headers.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Join a relative API path onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// An HTTP response of any status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Numeric status code.
    pub status: u16,
    /// Reason phrase, empty if unknown.
    pub reason: String,
    /// Body as text.
    pub body: String,
}

impl Response {
    /// Build a response, filling in the canonical reason phrase.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = ureq::http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    /// 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Status line such as `412 Precondition Failed`.
    #[must_use]
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}

/// Blocking request/response transport for one backend.
///
/// Paths are relative to the transport's endpoint. Implementations return
/// every HTTP status as a [`Response`]; only failures to obtain a response
/// are errors.
pub trait Transport: Send + Sync {
    /// `GET <base>/<path>`
    fn get(&self, path: &str) -> Result<Response>;

    /// `POST <base>/<path>` with a body of the given content type
    fn post(&self, path: &str, content_type: &str, body: &str) -> Result<Response>;

    /// Human-readable target, for logs.
    fn describe(&self) -> String;
}

const USER_AGENT: &str = concat!("restkit/", env!("CARGO_PKG_VERSION"));

/// `ureq`-backed transport.
///
/// No timeout or retry is configured; wrap calls if you need either.
pub struct HttpClient {
    agent: ureq::Agent,
    endpoint: Endpoint,
}

impl HttpClient {
    /// Create a client for an endpoint.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint,
        }
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn decorate<B>(&self, mut request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        request = request
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json, application/yaml");
        if let Some(auth) = &self.endpoint.auth {
            request = request.header("Authorization", auth.header_value());
        }
        for (name, value) in &self.endpoint.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }
}

fn read_response(
    method: &'static str,
    url: &str,
    result: std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<Response> {
    let mut response = result.map_err(|e| Error::request(method, url, &e))?;
    let status = response.status();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| Error::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    log::debug!("{method} {url} -> {status}");
    Ok(Response {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}

impl Transport for HttpClient {
    fn get(&self, path: &str) -> Result<Response> {
        let url = self.endpoint.url(path);
        let request = self.decorate(self.agent.get(&url));
        read_response("GET", &url, request.call())
    }

    fn post(&self, path: &str, content_type: &str, body: &str) -> Result<Response> {
        let url = self.endpoint.url(path);
        let request = self
            .decorate(self.agent.post(&url))
            .header("Content-Type", content_type);
        read_response("POST", &url, request.send(body))
    }

    fn describe(&self) -> String {
        self.endpoint.base_url.clone()
    }
}

/// Transport for a backend with no configured endpoint.
///
/// Every call fails with the message given at construction, so commands that
/// never touch this backend keep working.
#[derive(Debug, Clone)]
pub struct Unconfigured {
    message: String,
}

impl Unconfigured {
    /// Create with the message to report, e.g. which setting is missing.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Transport for Unconfigured {
    fn get(&self, _path: &str) -> Result<Response> {
        Err(Error::Unconfigured(self.message.clone()))
    }

    fn post(&self, _path: &str, _content_type: &str, _body: &str) -> Result<Response> {
        Err(Error::Unconfigured(self.message.clone()))
    }

    fn describe(&self) -> String {
        "<unconfigured>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_joins_single_slash() {
        let endpoint = Endpoint::new("http://grafana:3000/");
        assert_eq!(endpoint.base_url(), "http://grafana:3000");
        assert_eq!(
            endpoint.url("api/datasources"),
            "http://grafana:3000/api/datasources"
        );
        assert_eq!(
            endpoint.url("/api/datasources"),
            "http://grafana:3000/api/datasources"
        );
    }

    #[test]
    fn test_endpoint_keeps_sub_path() {
        let endpoint = Endpoint::new("https://example.com/grafana");
        assert_eq!(
            endpoint.url("api/dashboards/db"),
            "https://example.com/grafana/api/dashboards/db"
        );
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(Auth::Bearer("abc".into()).header_value(), "Bearer abc");
    }

    #[test]
    fn test_basic_header() {
        let auth = Auth::Basic {
            username: "admin".into(),
            password: "admin".into(),
        };
        assert_eq!(auth.header_value(), "Basic YWRtaW46YWRtaW4=");
    }

    #[test]
    fn test_auth_debug_hides_secrets() {
        let auth = Auth::Basic {
            username: "tenant".into(),
            password: "secret".into(),
        };
        let debug = format!("{auth:?}");
        assert!(debug.contains("tenant"));
        assert!(!debug.contains("secret"));
        assert!(!format!("{:?}", Auth::Bearer("tok".into())).contains("tok"));
    }

    #[test]
    fn test_endpoint_headers() {
        let endpoint = Endpoint::new("http://ruler").with_header("X-Scope-OrgID", "42");
        assert_eq!(
            endpoint.headers(),
            &[("X-Scope-OrgID".to_string(), "42".to_string())]
        );
    }

    #[test]
    fn test_response_status_line() {
        assert_eq!(Response::new(404, "").status_line(), "404 Not Found");
        assert_eq!(
            Response::new(412, "").status_line(),
            "412 Precondition Failed"
        );
        assert_eq!(Response::new(599, "").status_line(), "599");
    }

    #[test]
    fn test_response_is_success() {
        assert!(Response::new(200, "").is_success());
        assert!(Response::new(202, "").is_success());
        assert!(!Response::new(404, "").is_success());
        assert!(!Response::new(500, "").is_success());
    }

    #[test]
    fn test_unconfigured_transport_fails_every_call() {
        let transport = Unconfigured::new("grafana URL not configured");
        let err = transport.get("api/datasources/name/x").unwrap_err();
        assert_eq!(err.to_string(), "grafana URL not configured");
        assert!(transport.post("api/datasources", "application/json", "{}").is_err());
    }
}
