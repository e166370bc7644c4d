use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured detail object attached to API error responses.
///
/// Google APIs report machine-readable error context (quota domain, reason
/// codes, links) as a list of these objects under `error.details`. Fields not
/// modeled here are preserved in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Protobuf type URL of the detail payload (e.g. `type.googleapis.com/...`)
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub type_url: Option<String>,

    /// Short machine-readable reason code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Logical grouping for the reason (e.g. `googleapis.com`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Additional structured metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Any fields the API sent that this struct does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Defines errors that can occur when constructing or sending API requests.
///
/// Validation failures (`InvalidRequest`) are always raised synchronously,
/// before any network traffic. Transport-level failures are wrapped exactly
/// once, preserving the original failure as the error source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Caller input violated a structural invariant of the request model.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The API answered with a non-success status.
    ///
    /// Carries the HTTP status line and the server-reported error message,
    /// plus the structured `error.details` list when the server supplied one.
    #[error("API error (HTTP {status_code} {status_text}): {message}")]
    Api {
        /// HTTP status code (e.g. 400, 429, 500)
        status_code: u16,
        /// HTTP reason phrase (e.g. "Too Many Requests")
        status_text: String,
        /// Error message from the API response body
        message: String,
        /// Structured error details, if the server supplied them
        details: Option<Vec<ErrorDetails>>,
    },

    /// The HTTP exchange itself failed (connection, TLS, protocol).
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded as the expected JSON shape.
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A file could not be read prior to upload encoding.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path of the unreadable file
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },
}
