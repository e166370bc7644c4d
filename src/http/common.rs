//! Endpoint construction and shared request headers.

use std::fmt;

/// Represents the API version to target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    #[default]
    V1Beta,
}

impl ApiVersion {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V1Beta => "v1beta",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BASE_URL_PREFIX: &str = "https://generativelanguage.googleapis.com";

/// Header name for API key authentication.
///
/// Header-based auth keeps keys out of server logs, proxy logs, and error
/// messages containing URLs.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Header naming the client library and version on every call.
pub const CLIENT_HEADER: &str = "x-goog-api-client";

const PACKAGE_LOG_HEADER: &str = "genai-core";

/// Value for [`CLIENT_HEADER`], e.g. `genai-core/0.1.0`.
#[must_use]
pub fn client_header_value() -> String {
    format!("{PACKAGE_LOG_HEADER}/{}", env!("CARGO_PKG_VERSION"))
}

/// The RPC verb suffix of a model-scoped endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    GenerateContent,
    StreamGenerateContent,
    CountTokens,
    EmbedContent,
    BatchEmbedContents,
}

impl Task {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GenerateContent => "generateContent",
            Self::StreamGenerateContent => "streamGenerateContent",
            Self::CountTokens => "countTokens",
            Self::EmbedContent => "embedContent",
            Self::BatchEmbedContents => "batchEmbedContents",
        }
    }

    /// Whether the endpoint is consumed as a server-sent-event stream.
    const fn requires_sse(self) -> bool {
        matches!(self, Self::StreamGenerateContent)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constructs the endpoint URL for a model-scoped task.
#[must_use]
pub fn construct_model_url(model: &str, task: Task, version: ApiVersion) -> String {
    let sse_param = if task.requires_sse() { "?alt=sse" } else { "" };
    format!("{BASE_URL_PREFIX}/{version}/models/{model}:{task}{sse_param}")
}

/// Constructs the Files API collection URL (list).
#[must_use]
pub fn construct_files_url(version: ApiVersion) -> String {
    format!("{BASE_URL_PREFIX}/{version}/files")
}

/// Constructs the URL of a single file resource (get, delete).
#[must_use]
pub fn construct_file_url(version: ApiVersion, file_id: &str) -> String {
    format!("{BASE_URL_PREFIX}/{version}/files/{file_id}")
}

/// Constructs the multipart upload URL.
#[must_use]
pub fn construct_upload_url(version: ApiVersion) -> String {
    format!("{BASE_URL_PREFIX}/upload/{version}/files")
}

/// Prefixes a bare model id with `models/`; names already containing a path
/// separator (including tuned model references) pass through unchanged.
#[must_use]
pub fn qualify_model_name(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}
