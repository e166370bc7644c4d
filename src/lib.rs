//! Request construction and transport for Google's Generative AI (Gemini)
//! API.
//!
//! The crate does three things:
//!
//! 1. **Normalizes caller input.** A prompt can be a plain string, a mixed
//!    sequence of strings and typed [`Part`]s, or an already-structured
//!    request; the formatters reduce all of them to one canonical envelope,
//!    rejecting combinations the server would refuse before any network
//!    traffic.
//! 2. **Performs the HTTP exchange.** One POST per call, API key in the
//!    `x-goog-api-key` header, non-success responses surfaced as
//!    [`Error::Api`] with the server's message and structured details. No
//!    retries, no connection pooling beyond reqwest's own.
//! 3. **Encodes multipart file uploads.** The Files API upload body is a
//!    `multipart/related` envelope (JSON metadata part + raw bytes part)
//!    assembled by [`build_multipart_body`] with an injected random
//!    boundary.
//!
//! # Example
//!
//! ```ignore
//! use genai_core::Client;
//!
//! # async fn example() -> Result<(), genai_core::Error> {
//! let client = Client::new(std::env::var("GEMINI_API_KEY").unwrap());
//!
//! let response = client
//!     .generate_content("gemini-pro", "Explain multipart/related in one line")
//!     .await?;
//! println!("{}", response.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod content;
pub mod errors;
pub mod http;
pub mod request;
pub mod response;
pub mod tools;

pub use client::{Client, ClientBuilder};

pub use content::{
    Blob, Content, ContentInput, FunctionCall, FunctionResponse, Part, PartInput, Role,
    SystemInstruction, format_new_content, format_system_instruction,
};

pub use errors::{Error, ErrorDetails};

pub use request::{
    BatchEmbedContentsRequest, CachedContent, CountTokensBody, CountTokensInput,
    CountTokensRequest, EmbedContentInput, EmbedContentRequest, GenerateContentInput,
    GenerateContentRequest, GenerationConfig, HarmBlockThreshold, HarmCategory, ModelParams,
    SafetySetting, TaskType, format_count_tokens_input, format_embed_content_input,
    format_generate_content_input,
};

pub use response::{
    BatchEmbedContentsResponse, Candidate, ContentEmbedding, CountTokensResponse,
    EmbedContentResponse, GenerateContentResponse, HarmProbability, PromptFeedback, SafetyRating,
    UsageMetadata,
};

pub use tools::{
    CodeExecution, FunctionCallingConfig, FunctionCallingMode, FunctionDeclaration,
    FunctionParameters, Tool, ToolConfig,
};

pub use http::common::{
    API_KEY_HEADER, ApiVersion, CLIENT_HEADER, Task, client_header_value, construct_file_url,
    construct_files_url, construct_model_url, construct_upload_url, qualify_model_name,
};

pub use http::files::{
    FileMetadata, FileState, ListFilesResponse, MultipartBody, UPLOAD_PROTOCOL_HEADER,
    UploadFileResponse, UploadMetadata, build_multipart_body, gen_boundary,
};
