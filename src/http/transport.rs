//! The HTTP exchange itself: send a canonical body, surface typed failures.
//!
//! This is the only place lower-layer failures are re-wrapped into the crate
//! error taxonomy; the server-reported message and structured details are
//! preserved on the way through. No retries, no backoff.

use reqwest::{Client as ReqwestClient, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::common::{API_KEY_HEADER, CLIENT_HEADER, client_header_value};
use crate::errors::{Error, ErrorDetails};

/// Maximum characters of a response body quoted in diagnostics.
const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Error envelope the API uses for non-success responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorPayload,
}

#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    message: Option<String>,
    details: Option<Vec<ErrorDetails>>,
}

/// POSTs a JSON body and decodes the JSON response.
///
/// # Errors
///
/// Returns [`Error::Http`] on transport failure, [`Error::Api`] on a
/// non-success status, and [`Error::Json`] if the success body cannot be
/// decoded.
pub async fn post_json<B, T>(
    http_client: &ReqwestClient,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<T, Error>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    log::debug!("POST {url}");

    let response = http_client
        .post(url)
        .header(API_KEY_HEADER, api_key)
        .header(CLIENT_HEADER, client_header_value())
        .json(body)
        .send()
        .await?;

    let response = check_response(response).await?;
    decode_json(response).await
}

/// Passes successful responses through; reads failed ones into [`Error::Api`].
///
/// # Errors
///
/// Returns [`Error::Api`] carrying the status line, the server's error
/// message (or a truncated raw-body preview when the body is not the
/// standard error envelope), and structured details when present.
pub async fn check_response(response: Response) -> Result<Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(read_error_response(response).await)
}

async fn read_error_response(response: Response) -> Error {
    let status = response.status();
    let status_code = status.as_u16();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("failed to read error body: {e}"));

    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => Error::Api {
            status_code,
            status_text,
            message: parsed
                .error
                .message
                .unwrap_or_else(|| truncate_for_context(&body, ERROR_BODY_PREVIEW_LENGTH)),
            details: parsed.error.details,
        },
        Err(_) => Error::Api {
            status_code,
            status_text,
            message: truncate_for_context(&body, ERROR_BODY_PREVIEW_LENGTH),
            details: None,
        },
    }
}

/// Reads a response body and decodes it, logging a body preview on failure.
///
/// # Errors
///
/// Returns [`Error::Http`] if the body cannot be read and [`Error::Json`] if
/// it does not match the expected shape.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let text = response.text().await.map_err(Error::Http)?;
    serde_json::from_str(&text).map_err(|error| {
        log::warn!(
            "failed to decode response body: {error} | context: {}",
            truncate_for_context(&text, ERROR_BODY_PREVIEW_LENGTH)
        );
        Error::Json(error)
    })
}

/// Truncates a string to `max_len` bytes at a character boundary, appending
/// "..." when truncated.
fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}
