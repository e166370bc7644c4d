//! Files API: multipart upload encoding and file management.
//!
//! Uploads go out as a single `multipart/related` body: a JSON metadata part
//! followed by the raw file bytes, delimited by a generated boundary token.
//! The envelope is assembled in [`build_multipart_body`] and consumed
//! immediately by the upload call; nothing is retained.
//!
//! The boundary's random source is injected so tests can pin it and assert
//! exact byte-for-byte output.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};

use super::common::{
    API_KEY_HEADER, ApiVersion, CLIENT_HEADER, client_header_value, construct_file_url,
    construct_files_url, construct_upload_url,
};
use super::transport::{check_response, decode_json};
use crate::errors::Error;

/// Header selecting the upload protocol on the upload endpoint.
pub const UPLOAD_PROTOCOL_HEADER: &str = "X-Goog-Upload-Protocol";

/// Metadata sent in the JSON part of a multipart upload.
///
/// Constructed fresh per upload and discarded once the body is built.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    /// MIME type of the file being uploaded
    pub mime_type: String,
    /// Human-readable name shown in file listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Resource name of the form `files/<id>`; omitted when the caller
    /// supplied none (the server then assigns one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UploadMetadata {
    /// Creates upload metadata, qualifying a bare resource name.
    ///
    /// A `name` without a `/` is prefixed with `files/`; already-qualified
    /// names pass through unchanged, so the step is idempotent.
    pub fn new(
        mime_type: impl Into<String>,
        display_name: Option<String>,
        name: Option<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            display_name,
            name: name.map(qualify_file_name),
        }
    }
}

fn qualify_file_name(name: String) -> String {
    if name.contains('/') {
        name
    } else {
        format!("files/{name}")
    }
}

/// Outer JSON wrapper of the metadata part.
#[derive(Serialize)]
struct UploadPayload<'a> {
    file: &'a UploadMetadata,
}

/// An assembled `multipart/related` body and its `Content-Type` value.
#[derive(Clone, Debug, PartialEq)]
pub struct MultipartBody {
    /// `multipart/related; boundary=<boundary>`
    pub content_type: String,
    /// The full body bytes
    pub body: Bytes,
}

/// Generates a boundary token from two independent fractional draws.
///
/// Collision probability with payload content only needs to be astronomically
/// low, not adversarially resistant, so a plain PRNG is fine. Pass a seeded
/// RNG for deterministic output in tests.
pub fn gen_boundary<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut boundary = String::new();
    for _ in 0..2 {
        let draw: f64 = rng.random();
        let digits = draw.to_string();
        boundary.push_str(digits.strip_prefix("0.").unwrap_or(&digits));
    }
    boundary
}

/// Assembles the `multipart/related` upload envelope.
///
/// Layout, metadata part always first:
///
/// ```text
/// --{boundary}
/// Content-Type: application/json; charset=utf-8
///
/// {"file": {...}}
/// --{boundary}
/// Content-Type: {file mime type}
///
/// <file bytes>
/// --{boundary}--
/// ```
///
/// # Errors
///
/// Returns [`Error::Json`] if the metadata cannot be serialized.
pub fn build_multipart_body(
    metadata: &UploadMetadata,
    file_data: &[u8],
    boundary: &str,
) -> Result<MultipartBody, Error> {
    let metadata_json = serde_json::to_string(&UploadPayload { file: metadata })?;

    let preamble = format!(
        "--{boundary}\r\nContent-Type: application/json; charset=utf-8\r\n\r\n\
         {metadata_json}\r\n--{boundary}\r\nContent-Type: {mime}\r\n\r\n",
        mime = metadata.mime_type,
    );
    let closing = format!("\r\n--{boundary}--");

    let mut body = BytesMut::with_capacity(preamble.len() + file_data.len() + closing.len());
    body.put_slice(preamble.as_bytes());
    body.put_slice(file_data);
    body.put_slice(closing.as_bytes());

    Ok(MultipartBody {
        content_type: format!("multipart/related; boundary={boundary}"),
        body: body.freeze(),
    })
}

/// Processing state of an uploaded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    /// Unrecognized state for forward compatibility
    #[serde(other)]
    Unknown,
}

/// An uploaded file as reported by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Resource name (e.g. `files/abc123`)
    pub name: String,

    /// User-provided display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// MIME type of the file
    pub mime_type: String,

    /// Size in bytes; the API reports this as a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,

    /// When the file will be automatically deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_hash: Option<String>,

    /// URI to reference this file in API calls
    #[serde(default)]
    pub uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<FileState>,
}

impl FileMetadata {
    /// Returns true if the file is still being processed.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        matches!(self.state, Some(FileState::Processing))
    }

    /// Returns true if the file is ready to use.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, Some(FileState::Active))
    }

    /// Returns true if file processing failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.state, Some(FileState::Failed))
    }
}

/// Wrapper for the upload response.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadFileResponse {
    pub file: FileMetadata,
}

/// Response from listing files.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    #[serde(default)]
    pub files: Vec<FileMetadata>,
    pub next_page_token: Option<String>,
}

/// Uploads file bytes as a multipart/related request.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] for an empty file, [`Error::Api`] on a
/// non-success response, or the transport/decoding errors of the exchange.
pub async fn upload_file(
    http_client: &ReqwestClient,
    api_key: &str,
    file_data: Vec<u8>,
    metadata: UploadMetadata,
    version: ApiVersion,
) -> Result<FileMetadata, Error> {
    if file_data.is_empty() {
        return Err(Error::InvalidRequest(
            "cannot upload an empty file".to_string(),
        ));
    }

    log::debug!(
        "uploading {} bytes, mime_type={}, display_name={:?}, name={:?}",
        file_data.len(),
        metadata.mime_type,
        metadata.display_name,
        metadata.name,
    );

    let boundary = gen_boundary(&mut rand::rng());
    let payload = build_multipart_body(&metadata, &file_data, &boundary)?;

    let response = http_client
        .post(construct_upload_url(version))
        .header(API_KEY_HEADER, api_key)
        .header(CLIENT_HEADER, client_header_value())
        .header(UPLOAD_PROTOCOL_HEADER, "multipart")
        .header(reqwest::header::CONTENT_TYPE, &payload.content_type)
        .body(payload.body)
        .send()
        .await?;

    let response = check_response(response).await?;
    let upload: UploadFileResponse = decode_json(response).await?;

    log::debug!("file uploaded: name={}, uri={}", upload.file.name, upload.file.uri);

    Ok(upload.file)
}

/// Lists uploaded files.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn list_files(
    http_client: &ReqwestClient,
    api_key: &str,
    page_size: Option<u32>,
    page_token: Option<&str>,
    version: ApiVersion,
) -> Result<ListFilesResponse, Error> {
    let mut url = construct_files_url(version);
    let mut separator = '?';
    if let Some(size) = page_size {
        url.push_str(&format!("{separator}pageSize={size}"));
        separator = '&';
    }
    if let Some(token) = page_token {
        url.push_str(&format!("{separator}pageToken={}", urlencoding::encode(token)));
    }

    log::debug!("GET {url}");

    let response = http_client
        .get(&url)
        .header(API_KEY_HEADER, api_key)
        .header(CLIENT_HEADER, client_header_value())
        .send()
        .await?;

    let response = check_response(response).await?;
    decode_json(response).await
}

/// Gets metadata for a file by id or resource name.
///
/// # Errors
///
/// Returns an error if the request fails or the file does not exist.
pub async fn get_file(
    http_client: &ReqwestClient,
    api_key: &str,
    file_id: &str,
    version: ApiVersion,
) -> Result<FileMetadata, Error> {
    let url = construct_file_url(version, parse_file_id(file_id));

    log::debug!("GET {url}");

    let response = http_client
        .get(&url)
        .header(API_KEY_HEADER, api_key)
        .header(CLIENT_HEADER, client_header_value())
        .send()
        .await?;

    let response = check_response(response).await?;
    decode_json(response).await
}

/// Deletes a file by id or resource name.
///
/// # Errors
///
/// Returns an error if the request fails or the file does not exist.
pub async fn delete_file(
    http_client: &ReqwestClient,
    api_key: &str,
    file_id: &str,
    version: ApiVersion,
) -> Result<(), Error> {
    let url = construct_file_url(version, parse_file_id(file_id));

    log::debug!("DELETE {url}");

    let response = http_client
        .delete(&url)
        .header(API_KEY_HEADER, api_key)
        .header(CLIENT_HEADER, client_header_value())
        .send()
        .await?;

    check_response(response).await?;
    Ok(())
}

/// Strips a `files/` prefix so callers may pass either form.
fn parse_file_id(file_id: &str) -> &str {
    file_id.strip_prefix("files/").unwrap_or(file_id)
}
