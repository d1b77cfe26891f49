//! Transport seam between the repository core and the REST backend.
//!
//! The repository never talks HTTP directly; it hands a method, a collection
//! path, query pairs, and an optional JSON body to a [`Transport`] and gets
//! back the status code plus the decoded JSON body. Non-2xx statuses are
//! data, not transport errors - classification happens in the repository,
//! which knows what a 404 or 409 means for the operation it issued.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod http;

pub use http::HttpTransport;

/// HTTP method subset used by the repository core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    /// Full-record replace of the rows matched by the query filter.
    Patch,
    Delete,
}

impl Method {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw backend response: status code plus decoded JSON body.
///
/// The body is [`Value::Null`] for responses without content (e.g. 204).
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Errors raised below the status-code level: the request never completed,
/// or the response body was not JSON at all.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport could not be constructed from the configuration.
    #[error("transport configuration error: {0}")]
    Config(String),

    /// The collection path could not be joined onto the base URL.
    #[error("invalid request URL: {0}")]
    Url(String),

    /// The response body was not valid JSON.
    #[error("response body was not valid JSON: {0}")]
    Body(String),
}

/// A connection to the REST backend.
///
/// Implemented by [`HttpTransport`] in production and by in-memory fakes in
/// tests. Implementations must be cheap to share behind an `Arc`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request against a collection.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` only when no response was obtained; backend
    /// rejections come back as a [`Response`] with a non-2xx status.
    async fn request(
        &self,
        method: Method,
        collection: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Response, TransportError>;
}
