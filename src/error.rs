//! Error types for hierarchy ingestion and backend calls.

use thiserror::Error;

/// A hierarchy payload that cannot be turned into a tree.
#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("invalid hierarchy JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A node without a usable id. `path` is the child-index path from the root.
    #[error("node at {path} has an empty id")]
    EmptyId { path: String },

    #[error("duplicate node id '{id}'")]
    DuplicateId { id: String },
}

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the backend. The caller drops its session and asks the user to log in.
    #[error("not authenticated (session expired or token rejected)")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot read upload '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

impl ApiError {
    /// Wrap a transport error, pulling timeouts out into their own variant.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(err)
        }
    }
}
