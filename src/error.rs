//! Error types for Nulz Mail operations.

use reqwest::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The API rejected the request, the request timed out, or the response
    /// body could not be decoded.
    ///
    /// `body` holds the parsed error payload when the server sent one; its
    /// shape varies by endpoint, so it stays an open [`Value`]. Client-side
    /// timeouts use status 408 and carry no body.
    #[error("{message}")]
    Api {
        /// Human-readable description of the failure.
        message: String,
        /// HTTP status code of the failing response (408 for timeouts).
        status: u16,
        /// Parsed or raw error payload, when one was available.
        body: Option<Value>,
    },

    /// Transport-level failure from the underlying HTTP client.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A response decoded cleanly but did not match the expected shape.
    #[error("response shape mismatch: {0}")]
    Json(#[from] serde_json::Error),

    /// The client was configured with an invalid value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is a client-side request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Api { status: 408, body: None, .. })
    }

    pub(crate) fn timeout() -> Self {
        Error::Api {
            message: "Request timeout".to_string(),
            status: 408,
            body: None,
        }
    }

    /// Normalize a non-success response into an [`Error::Api`].
    ///
    /// Always produces an error value; a body that cannot be read or parsed
    /// degrades to raw-text handling instead of failing.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Self::from_parts(status, &text)
    }

    fn from_parts(status: StatusCode, text: &str) -> Self {
        let body = if text.is_empty() {
            json!({})
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| json!({ "error": text }))
        };

        // Message priority: the body's `error` field, then the status reason
        // phrase, then a bare status line.
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        Error::Api {
            message,
            status: status.as_u16(),
            body: Some(body),
        }
    }
}
