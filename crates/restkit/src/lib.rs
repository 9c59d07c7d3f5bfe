//! # restkit
//!
//! Minimal blocking REST transport for backend APIs.
//!
//! This crate provides:
//! - [`Transport`]: a request/response seam (`get`, `post`) that returns
//!   every HTTP status as a [`Response`] so callers decide what 404 or 412
//!   mean for them
//! - [`HttpClient`]: the `ureq` implementation, configured from an
//!   [`Endpoint`] (base URL, [`Auth`], extra headers)
//! - [`MockTransport`]: an in-memory implementation for tests
//! - [`Unconfigured`]: a placeholder that fails every call with a message
//!
//! ## Example
//!
//! ```no_run
//! use restkit::{Auth, Endpoint, HttpClient, Transport};
//!
//! let endpoint = Endpoint::new("http://localhost:3000")
//!     .with_auth(Auth::Bearer("glsa_xxx".into()));
//! let client = HttpClient::new(endpoint);
//!
//! let response = client.get("api/datasources/name/prometheus").unwrap();
//! if response.status == 404 {
//!     println!("not there yet");
//! }
//! ```
//!
//! ## Testing
//!
//! ```
//! use restkit::{MockTransport, Response, Transport};
//!
//! let mock = MockTransport::new();
//! mock.on_get("api/datasources/name/prom-1", Response::new(200, r#"{"name":"prom-1"}"#));
//!
//! let response = mock.get("api/datasources/name/prom-1").unwrap();
//! assert!(response.is_success());
//! assert_eq!(mock.count("GET", "api/datasources/name/prom-1"), 1);
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod mock;

pub use client::{Auth, Endpoint, HttpClient, Response, Transport, Unconfigured};
pub use error::{Error, Result};
pub use mock::{MockTransport, RecordedRequest};
