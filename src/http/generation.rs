//! One async call per model-scoped API method.
//!
//! These take already-canonical request envelopes; see the formatters in
//! [`crate::request`] for turning loose caller input into them.

use reqwest::Client as ReqwestClient;

use super::common::{ApiVersion, Task, construct_model_url};
use super::transport::post_json;
use crate::errors::Error;
use crate::request::{BatchEmbedContentsRequest, CountTokensBody, EmbedContentRequest, GenerateContentRequest};
use crate::response::{
    BatchEmbedContentsResponse, CountTokensResponse, EmbedContentResponse, GenerateContentResponse,
};

/// Sends a generateContent request.
///
/// # Errors
///
/// Returns an error if the HTTP exchange fails, the API reports a
/// non-success status, or the response cannot be decoded.
pub async fn generate_content(
    http_client: &ReqwestClient,
    api_key: &str,
    model: &str,
    request: &GenerateContentRequest,
    version: ApiVersion,
) -> Result<GenerateContentResponse, Error> {
    let url = construct_model_url(model, Task::GenerateContent, version);
    post_json(http_client, &url, api_key, request).await
}

/// Sends a countTokens request.
///
/// # Errors
///
/// Returns an error if the HTTP exchange fails, the API reports a
/// non-success status, or the response cannot be decoded.
pub async fn count_tokens(
    http_client: &ReqwestClient,
    api_key: &str,
    model: &str,
    body: &CountTokensBody,
    version: ApiVersion,
) -> Result<CountTokensResponse, Error> {
    let url = construct_model_url(model, Task::CountTokens, version);
    post_json(http_client, &url, api_key, body).await
}

/// Sends an embedContent request.
///
/// # Errors
///
/// Returns an error if the HTTP exchange fails, the API reports a
/// non-success status, or the response cannot be decoded.
pub async fn embed_content(
    http_client: &ReqwestClient,
    api_key: &str,
    model: &str,
    request: &EmbedContentRequest,
    version: ApiVersion,
) -> Result<EmbedContentResponse, Error> {
    let url = construct_model_url(model, Task::EmbedContent, version);
    post_json(http_client, &url, api_key, request).await
}

/// Sends a batchEmbedContents request.
///
/// # Errors
///
/// Returns an error if the HTTP exchange fails, the API reports a
/// non-success status, or the response cannot be decoded.
pub async fn batch_embed_contents(
    http_client: &ReqwestClient,
    api_key: &str,
    model: &str,
    request: &BatchEmbedContentsRequest,
    version: ApiVersion,
) -> Result<BatchEmbedContentsResponse, Error> {
    let url = construct_model_url(model, Task::BatchEmbedContents, version);
    post_json(http_client, &url, api_key, request).await
}
