//! The client front-end tying formatters, URLs and transport together.

use std::path::Path;

use reqwest::Client as ReqwestClient;

use crate::errors::Error;
use crate::http::common::{ApiVersion, qualify_model_name};
use crate::http::{files, generation};
use crate::request::{
    BatchEmbedContentsRequest, CountTokensInput, EmbedContentInput, GenerateContentInput,
    ModelParams, format_count_tokens_input, format_embed_content_input,
    format_generate_content_input,
};
use crate::response::{
    BatchEmbedContentsResponse, CountTokensResponse, EmbedContentResponse, GenerateContentResponse,
};

/// Client for the Google Generative AI API.
///
/// Cheap to clone; the underlying HTTP client is shared. All request
/// formatting happens synchronously before the network call, so invalid
/// input fails without touching the wire.
///
/// # Example
///
/// ```ignore
/// use genai_core::Client;
///
/// # async fn example() -> Result<(), genai_core::Error> {
/// let client = Client::new("api-key");
/// let response = client.generate_content("gemini-pro", "What is this?").await?;
/// println!("{}", response.text().unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    api_key: String,
    http_client: ReqwestClient,
    api_version: ApiVersion,
}

/// Builder for [`Client`] instances.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    api_key: String,
    api_version: Option<ApiVersion>,
    http_client: Option<ReqwestClient>,
}

impl ClientBuilder {
    /// Sets the API version; defaults to [`ApiVersion::V1Beta`].
    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Supplies a pre-configured reqwest client (proxy, timeouts, ...).
    #[must_use]
    pub fn http_client(mut self, http_client: ReqwestClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Builds the [`Client`].
    #[must_use]
    pub fn build(self) -> Client {
        Client {
            api_key: self.api_key,
            http_client: self.http_client.unwrap_or_default(),
            api_version: self.api_version.unwrap_or_default(),
        }
    }
}

impl Client {
    /// Creates a client with default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder(api_key).build()
    }

    /// Starts building a client.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            api_key: api_key.into(),
            ..ClientBuilder::default()
        }
    }

    /// The API version this client targets.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Generates content from loose input: a string, a mixed part sequence,
    /// or a structured request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for invalid input combinations
    /// (before any network traffic), or a transport-layer error.
    pub async fn generate_content(
        &self,
        model: &str,
        input: impl Into<GenerateContentInput>,
    ) -> Result<GenerateContentResponse, Error> {
        let request = format_generate_content_input(input)?;
        generation::generate_content(
            &self.http_client,
            &self.api_key,
            model,
            &request,
            self.api_version,
        )
        .await
    }

    /// Counts tokens for loose input, optionally merging model-level
    /// defaults into the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when both `contents` and
    /// `generate_content_request` are supplied, or a transport-layer error.
    pub async fn count_tokens(
        &self,
        model: &str,
        input: impl Into<CountTokensInput>,
        model_params: Option<&ModelParams>,
    ) -> Result<CountTokensResponse, Error> {
        let mut body = format_count_tokens_input(input, model_params)?;
        body.model = Some(qualify_model_name(model));
        generation::count_tokens(
            &self.http_client,
            &self.api_key,
            model,
            &body,
            self.api_version,
        )
        .await
    }

    /// Embeds loose input content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for invalid input, or a
    /// transport-layer error.
    pub async fn embed_content(
        &self,
        model: &str,
        input: impl Into<EmbedContentInput>,
    ) -> Result<EmbedContentResponse, Error> {
        let request = format_embed_content_input(input)?;
        generation::embed_content(
            &self.http_client,
            &self.api_key,
            model,
            &request,
            self.api_version,
        )
        .await
    }

    /// Embeds a batch of inputs in one call, stamping each request with the
    /// qualified model name as the API requires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if any input is invalid, or a
    /// transport-layer error.
    pub async fn batch_embed_contents(
        &self,
        model: &str,
        inputs: Vec<EmbedContentInput>,
    ) -> Result<BatchEmbedContentsResponse, Error> {
        let model_name = qualify_model_name(model);
        let requests = inputs
            .into_iter()
            .map(|input| {
                let mut request = format_embed_content_input(input)?;
                request.model = Some(model_name.clone());
                Ok(request)
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let request = BatchEmbedContentsRequest { requests };
        generation::batch_embed_contents(
            &self.http_client,
            &self.api_key,
            model,
            &request,
            self.api_version,
        )
        .await
    }

    /// Uploads a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read (the multipart
    /// encoder never runs in that case), or the upload's transport errors.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        metadata: files::UploadMetadata,
    ) -> Result<files::FileMetadata, Error> {
        let path = path.as_ref();
        let file_data = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        files::upload_file(
            &self.http_client,
            &self.api_key,
            file_data,
            metadata,
            self.api_version,
        )
        .await
    }

    /// Uploads in-memory bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for empty data, or the upload's
    /// transport errors.
    pub async fn upload_file_bytes(
        &self,
        file_data: Vec<u8>,
        metadata: files::UploadMetadata,
    ) -> Result<files::FileMetadata, Error> {
        files::upload_file(
            &self.http_client,
            &self.api_key,
            file_data,
            metadata,
            self.api_version,
        )
        .await
    }

    /// Lists uploaded files.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_files(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<files::ListFilesResponse, Error> {
        files::list_files(
            &self.http_client,
            &self.api_key,
            page_size,
            page_token,
            self.api_version,
        )
        .await
    }

    /// Gets metadata for a file by id or resource name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file does not exist.
    pub async fn get_file(&self, file_id: &str) -> Result<files::FileMetadata, Error> {
        files::get_file(&self.http_client, &self.api_key, file_id, self.api_version).await
    }

    /// Deletes a file by id or resource name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file does not exist.
    pub async fn delete_file(&self, file_id: &str) -> Result<(), Error> {
        files::delete_file(&self.http_client, &self.api_key, file_id, self.api_version).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = Client::new("test-key");
        assert_eq!(client.api_version(), ApiVersion::V1Beta);
    }

    #[test]
    fn test_builder_overrides_version() {
        let client = Client::builder("test-key")
            .api_version(ApiVersion::V1)
            .build();
        assert_eq!(client.api_version(), ApiVersion::V1);
    }

    #[tokio::test]
    async fn test_upload_file_missing_path_is_io_error() {
        let client = Client::new("test-key");
        let metadata = files::UploadMetadata::new("image/png", None, None);
        let error = client
            .upload_file("/definitely/not/a/real/path.png", metadata)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
    }

    #[tokio::test]
    async fn test_generate_content_invalid_input_fails_before_network() {
        use crate::content::{Part, PartInput};

        let client = Client::new("test-key");
        let input: Vec<PartInput> = vec![
            "text".into(),
            Part::function_response("f", serde_json::json!({})).into(),
        ];
        let error = client.generate_content("gemini-pro", input).await.unwrap_err();
        assert!(matches!(error, Error::InvalidRequest(_)));
    }
}
