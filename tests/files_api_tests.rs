//! Files API tests: exact multipart framing and the upload exchange against
//! a mock server.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use genai_core::http::transport::{check_response, decode_json};
use genai_core::{
    Error, FileState, UPLOAD_PROTOCOL_HEADER, UploadFileResponse, UploadMetadata,
    build_multipart_body, client_header_value, gen_boundary,
};

/// A conforming-enough multipart/related split for test assertions: returns
/// the part payloads between boundary delimiters, headers stripped.
fn split_multipart(body: &[u8], boundary: &str) -> Vec<Vec<u8>> {
    let delimiter = format!("\r\n--{boundary}");
    let opening = format!("--{boundary}");
    assert!(body.starts_with(opening.as_bytes()));

    let mut parts = Vec::new();
    let mut rest = &body[opening.len()..];
    loop {
        if rest.starts_with(b"--") {
            break; // closing delimiter
        }
        // Part headers end at the blank line.
        let header_end = rest
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("part headers terminated")
            + 4;
        let payload_and_rest = &rest[header_end..];
        let next = payload_and_rest
            .windows(delimiter.len())
            .position(|w| w == delimiter.as_bytes())
            .expect("boundary delimiter after part");
        parts.push(payload_and_rest[..next].to_vec());
        rest = &payload_and_rest[next + delimiter.len()..];
    }
    parts
}

#[test]
fn multipart_round_trip_yields_metadata_then_bytes() {
    let metadata = UploadMetadata::new(
        "image/jpeg",
        Some("mrcat".to_string()),
        Some("catname".to_string()),
    );
    let bytes = b"\x00\x01\x02definitely-binary\xff";
    let payload = build_multipart_body(&metadata, bytes, "testboundary").unwrap();

    let parts = split_multipart(&payload.body, "testboundary");
    assert_eq!(parts.len(), 2);

    let metadata_json: serde_json::Value = serde_json::from_slice(&parts[0]).unwrap();
    assert_eq!(
        metadata_json,
        json!({
            "file": {
                "mimeType": "image/jpeg",
                "displayName": "mrcat",
                "name": "files/catname"
            }
        })
    );
    assert_eq!(parts[1], bytes.to_vec());
}

#[test]
fn multipart_part_content_types_are_declared() {
    let metadata = UploadMetadata::new("image/jpeg", None, None);
    let payload = build_multipart_body(&metadata, b"bytes", "b123").unwrap();
    let text = String::from_utf8_lossy(&payload.body);

    assert!(text.contains("Content-Type: application/json; charset=utf-8"));
    assert!(text.contains("Content-Type: image/jpeg"));
    // Metadata part precedes the binary part.
    assert!(
        text.find("application/json").unwrap() < text.find("Content-Type: image/jpeg").unwrap()
    );
}

#[test]
fn already_qualified_name_is_not_reprefixed() {
    let metadata = UploadMetadata::new(
        "image/jpeg",
        Some("mrcat".to_string()),
        Some("files/catname".to_string()),
    );
    let payload = build_multipart_body(&metadata, b"B", "b").unwrap();
    let parts = split_multipart(&payload.body, "b");
    let metadata_json: serde_json::Value = serde_json::from_slice(&parts[0]).unwrap();
    assert_eq!(metadata_json["file"]["name"], "files/catname");
}

#[test]
fn generated_boundary_does_not_collide_with_small_payloads() {
    let mut rng = rand::rng();
    let boundary = gen_boundary(&mut rng);
    // Two fractional draws give a long digit string; payloads under test
    // never contain it.
    assert!(boundary.len() >= 10);
    assert!(!"plain text payload".contains(&boundary));
}

#[tokio::test]
async fn upload_exchange_sends_protocol_headers_and_decodes_file() {
    let mock_server = MockServer::start().await;

    let metadata = UploadMetadata::new(
        "image/jpeg",
        Some("mrcat".to_string()),
        Some("catname".to_string()),
    );
    let boundary = gen_boundary(&mut rand::rng());
    let payload = build_multipart_body(&metadata, b"catbytes", &boundary).unwrap();

    let response_json = json!({
        "file": {
            "name": "files/catname",
            "displayName": "mrcat",
            "mimeType": "image/jpeg",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/catname",
            "state": "ACTIVE"
        }
    });

    let expected_content_type = payload.content_type.clone();
    let expected_body = payload.body.to_vec();
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header(UPLOAD_PROTOCOL_HEADER, "multipart"))
        .and(header("x-goog-api-key", "test-key"))
        .and(move |request: &Request| {
            let content_type = request
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            content_type == expected_content_type && request.body == expected_body
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_json))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Same exchange upload_file performs, pointed at the mock server.
    let url = format!("{}/upload/v1beta/files", mock_server.uri());
    let response = reqwest::Client::new()
        .post(&url)
        .header("x-goog-api-key", "test-key")
        .header("x-goog-api-client", client_header_value())
        .header(UPLOAD_PROTOCOL_HEADER, "multipart")
        .header(reqwest::header::CONTENT_TYPE, &payload.content_type)
        .body(payload.body)
        .send()
        .await
        .unwrap();

    let response = check_response(response).await.unwrap();
    let upload: UploadFileResponse = decode_json(response).await.unwrap();

    assert_eq!(upload.file.name, "files/catname");
    assert_eq!(upload.file.state, Some(FileState::Active));
    assert!(upload.file.is_active());
}

#[tokio::test]
async fn upload_error_response_is_surfaced_as_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Permission denied on resource."}
        })))
        .mount(&mock_server)
        .await;

    let metadata = UploadMetadata::new("image/jpeg", None, None);
    let payload = build_multipart_body(&metadata, b"bytes", "b").unwrap();

    let url = format!("{}/upload/v1beta/files", mock_server.uri());
    let response = reqwest::Client::new()
        .post(&url)
        .header(UPLOAD_PROTOCOL_HEADER, "multipart")
        .header(reqwest::header::CONTENT_TYPE, &payload.content_type)
        .body(payload.body)
        .send()
        .await
        .unwrap();

    let error = check_response(response).await.unwrap_err();
    match error {
        Error::Api {
            status_code,
            message,
            ..
        } => {
            assert_eq!(status_code, 403);
            assert!(message.contains("Permission denied"));
        }
        other => panic!("expected Error::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn list_files_response_decodes_pagination() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                {"name": "files/a", "mimeType": "video/mp4", "uri": ""},
                {"name": "files/b", "mimeType": "image/png", "uri": ""}
            ],
            "nextPageToken": "token123"
        })))
        .mount(&mock_server)
        .await;

    let url = format!("{}/v1beta/files", mock_server.uri());
    let response = reqwest::Client::new().get(&url).send().await.unwrap();
    let response = check_response(response).await.unwrap();
    let list: genai_core::ListFilesResponse = decode_json(response).await.unwrap();

    assert_eq!(list.files.len(), 2);
    assert_eq!(list.next_page_token.as_deref(), Some("token123"));
}
