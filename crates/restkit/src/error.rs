//! Error types for REST transport operations.

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before a usable HTTP response is available.
///
/// Non-success statuses are not errors at this layer: they come back as a
/// [`crate::Response`] so callers can interpret 404 or 412 themselves.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or no response was received.
    #[error("{method} {url} failed: {message}")]
    Request {
        /// HTTP method.
        method: &'static str,
        /// Full request URL.
        url: String,
        /// Underlying error message.
        message: String,
    },

    /// The response body could not be read.
    #[error("failed to read response body from {url}: {message}")]
    Body {
        /// Full request URL.
        url: String,
        /// Underlying error message.
        message: String,
    },

    /// No endpoint is configured for this backend.
    #[error("{0}")]
    Unconfigured(String),
}

impl Error {
    pub(crate) fn request(method: &'static str, url: &str, err: &ureq::Error) -> Self {
        Self::Request {
            method,
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
