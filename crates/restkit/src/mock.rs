//! In-memory transport for tests.

use crate::client::{Response, Transport};
use crate::error::Result;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// `GET` or `POST`.
    pub method: &'static str,
    /// Path as passed to the transport.
    pub path: String,
    /// Content type of a POST body.
    pub content_type: Option<String>,
    /// POST body.
    pub body: Option<String>,
}

type RouteKey = (&'static str, String);

/// Mock transport for testing without network access.
///
/// Responses are queued per method and path. Each call takes the next queued
/// response; the last one repeats once the queue is down to it. Unrouted GETs
/// answer `404`, unrouted POSTs answer `200 {}`. Every request is recorded.
///
/// Clones share state, so a test can keep one handle and give another to the
/// code under test.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<RouteKey, VecDeque<Response>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Create a mock with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `GET <path>`.
    pub fn on_get(&self, path: impl Into<String>, response: Response) -> &Self {
        self.route("GET", path.into(), response);
        self
    }

    /// Queue a response for `POST <path>`.
    pub fn on_post(&self, path: impl Into<String>, response: Response) -> &Self {
        self.route("POST", path.into(), response);
        self
    }

    fn route(&self, method: &'static str, path: String, response: Response) {
        lock(&self.routes)
            .entry((method, path))
            .or_default()
            .push_back(response);
    }

    /// All requests, in the order they were made.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// All POST requests.
    #[must_use]
    pub fn posts(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "POST")
            .collect()
    }

    /// Number of requests made with a method to a path.
    #[must_use]
    pub fn count(&self, method: &str, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn respond(&self, request: RecordedRequest) -> Response {
        let key = (request.method, request.path.clone());
        lock(&self.requests).push(request);

        let mut routes = lock(&self.routes);
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
            Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
            None if key.0 == "GET" => not_found(),
            None => Response::new(200, "{}"),
        }
    }
}

fn not_found() -> Response {
    Response::new(404, r#"{"message":"Not found"}"#)
}

impl Transport for MockTransport {
    fn get(&self, path: &str) -> Result<Response> {
        Ok(self.respond(RecordedRequest {
            method: "GET",
            path: path.to_string(),
            content_type: None,
            body: None,
        }))
    }

    fn post(&self, path: &str, content_type: &str, body: &str) -> Result<Response> {
        Ok(self.respond(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            content_type: Some(content_type.to_string()),
            body: Some(body.to_string()),
        }))
    }

    fn describe(&self) -> String {
        "mock://".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrouted_defaults() {
        let mock = MockTransport::new();
        assert_eq!(mock.get("api/anything").unwrap().status, 404);
        assert_eq!(mock.post("api/anything", "application/json", "{}").unwrap().status, 200);
    }

    #[test]
    fn test_queue_then_repeat_last() {
        let mock = MockTransport::new();
        mock.on_get("x", Response::new(404, ""))
            .on_get("x", Response::new(200, "{}"));

        assert_eq!(mock.get("x").unwrap().status, 404);
        assert_eq!(mock.get("x").unwrap().status, 200);
        assert_eq!(mock.get("x").unwrap().status, 200);
        assert_eq!(mock.count("GET", "x"), 3);
    }

    #[test]
    fn test_records_post_bodies() {
        let mock = MockTransport::new();
        let handle = mock.clone();
        mock.post("api/datasources", "application/json", r#"{"name":"a"}"#)
            .unwrap();

        let posts = handle.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, "api/datasources");
        assert_eq!(posts[0].content_type.as_deref(), Some("application/json"));
        assert_eq!(posts[0].body.as_deref(), Some(r#"{"name":"a"}"#));
    }

    #[test]
    fn test_describe() {
        assert_eq!(MockTransport::new().describe(), "mock://");
    }
}
