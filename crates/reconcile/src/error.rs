//! Error types for reconciliation.
//!
//! Every operation returns errors per resource. Variants are categorized so
//! callers can tell an expected remote miss (drives the create path) from a
//! transport failure worth retrying and from everything else.

use crate::resource::ResourceKey;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Resource absent on the remote side.
    NotFound,
    /// Declared or remote document has the wrong shape.
    Decode,
    /// Network or HTTP-layer failure.
    Transport,
    /// Backend rejected a write because of a precondition.
    Conflict,
    /// Operation not supported for this resource kind.
    Unsupported,
    /// Declared set or registry is inconsistent.
    Declaration,
    /// Local filesystem failure.
    Io,
    /// Failure inside the engine itself.
    Internal,
}

impl ErrorCategory {
    /// Whether a caller may reasonably retry the operation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport)
    }

    /// Whether this is an expected outcome rather than a failure.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Short user-facing description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Resource not found",
            Self::Decode => "Malformed document",
            Self::Transport => "Backend communication failed",
            Self::Conflict => "Backend reported a conflict",
            Self::Unsupported => "Operation not supported",
            Self::Declaration => "Invalid declaration",
            Self::Io => "Filesystem error",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while parsing, fetching, rendering or pushing resources.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Remote lookup miss.
    #[error("{kind} '{uid}' not found")]
    NotFound {
        /// Provider name.
        kind: String,
        /// Resource uid.
        uid: String,
    },

    /// A declared or remote document could not be decoded.
    #[error("failed to decode {context}: {message}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Underlying decoder message.
        message: String,
    },

    /// Network failure or unexpected HTTP status.
    #[error("{message}")]
    Transport {
        /// Description including the resource and status line.
        message: String,
        /// HTTP status code if a response was received.
        status: Option<u16>,
    },

    /// Backend precondition failure (concurrent modification, version mismatch).
    #[error("conflict while applying '{uid}': {message}")]
    Conflict {
        /// Resource uid.
        uid: String,
        /// Backend-supplied message, verbatim.
        message: String,
    },

    /// Operation unsupported by the provider.
    #[error("{operation} is not implemented for {kind}")]
    NotImplemented {
        /// Provider name.
        kind: String,
        /// Operation name.
        operation: &'static str,
    },

    /// Two declared resources share a key.
    #[error("duplicate declaration of {0}")]
    DuplicateKey(ResourceKey),

    /// No provider with this name or path.
    #[error("no provider registered for '{0}'")]
    UnknownProvider(String),

    /// A provider with this name is already registered.
    #[error("provider '{0}' is already registered")]
    DuplicateProvider(String),

    /// A declared path is already claimed by another provider.
    #[error("path '{path}' is already claimed by provider '{owner}'")]
    PathClaimed {
        /// Declared top-level path.
        path: String,
        /// Provider that claimed it first.
        owner: String,
    },

    /// Two resources would be exported to the same file.
    #[error("{first} and {second} both export to {path}")]
    ExportCollision {
        /// Target file.
        path: PathBuf,
        /// Resource that claimed the file first.
        first: ResourceKey,
        /// Resource that collided with it.
        second: ResourceKey,
    },

    /// Worker pool for parallel apply could not be created.
    #[error("failed to create worker pool: {0}")]
    WorkerPool(String),

    /// IO error while persisting resources.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create a not-found error.
    pub fn not_found(kind: impl Into<String>, uid: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            uid: uid.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status,
        }
    }

    /// Create a conflict error.
    pub fn conflict(uid: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            uid: uid.into(),
            message: message.into(),
        }
    }

    /// Create a not-implemented error.
    pub fn not_implemented(kind: impl Into<String>, operation: &'static str) -> Self {
        Self::NotImplemented {
            kind: kind.into(),
            operation,
        }
    }

    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Decode { .. } => ErrorCategory::Decode,
            Error::Transport { .. } => ErrorCategory::Transport,
            Error::Conflict { .. } => ErrorCategory::Conflict,
            Error::NotImplemented { .. } => ErrorCategory::Unsupported,
            Error::DuplicateKey(_)
            | Error::DuplicateProvider(_)
            | Error::UnknownProvider(_)
            | Error::PathClaimed { .. }
            | Error::ExportCollision { .. } => {
                ErrorCategory::Declaration
            }
            Error::Io { .. } => ErrorCategory::Io,
            Error::WorkerPool(_) => ErrorCategory::Internal,
        }
    }

    /// Whether this is a remote lookup miss.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Whether the provider does not support the attempted operation.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented { .. })
    }

    /// Whether a caller may retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// HTTP status associated with the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport { status, .. } => *status,
            Error::Conflict { .. } => Some(412),
            Error::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}
