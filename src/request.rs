//! Canonical request envelopes and the formatters that produce them.
//!
//! Each API method accepts loosely-typed caller input (a string, a mixed
//! part sequence, or an already-structured request) and each formatter here
//! deterministically reduces it to the one canonical envelope the wire
//! expects, failing fast on combinations the server would reject.

use serde::{Deserialize, Serialize};

use crate::content::{
    Content, ContentInput, SystemInstruction, format_new_content, format_system_instruction,
};
use crate::errors::Error;
use crate::http::common::qualify_model_name;
use crate::tools::{Tool, ToolConfig};

/// Generation tuning knobs for a request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

/// Harm categories a safety setting can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
    #[serde(other)]
    Unknown,
}

/// Blocking thresholds for a harm category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// One per-category safety threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Task hint for embedding requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalQuery,
    RetrievalDocument,
    SemanticSimilarity,
    Classification,
    Clustering,
}

/// Reference to server-side cached content, by resource name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Model-level defaults merged into countTokens envelopes.
#[derive(Clone, Debug, Default)]
pub struct ModelParams {
    pub model: Option<String>,
    pub generation_config: Option<GenerationConfig>,
    pub safety_settings: Option<Vec<SafetySetting>>,
    pub tools: Option<Vec<Tool>>,
    pub tool_config: Option<ToolConfig>,
    pub system_instruction: Option<SystemInstruction>,
    pub cached_content: Option<CachedContent>,
}

/// The canonical generateContent envelope.
///
/// `model` is unset for plain generateContent calls; it is populated only
/// when the envelope is nested inside a countTokens payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_content: Option<String>,
}

/// Caller input for generateContent.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerateContentInput {
    /// Loose content: a string or a mixed part sequence
    Content(ContentInput),
    /// An already-structured request, passed through
    Request(GenerateContentRequest),
}

impl<'a> From<&'a str> for GenerateContentInput {
    fn from(text: &'a str) -> Self {
        Self::Content(text.into())
    }
}

impl From<String> for GenerateContentInput {
    fn from(text: String) -> Self {
        Self::Content(text.into())
    }
}

impl From<Vec<crate::content::PartInput>> for GenerateContentInput {
    fn from(parts: Vec<crate::content::PartInput>) -> Self {
        Self::Content(parts.into())
    }
}

impl From<Vec<crate::content::Part>> for GenerateContentInput {
    fn from(parts: Vec<crate::content::Part>) -> Self {
        Self::Content(parts.into())
    }
}

impl From<ContentInput> for GenerateContentInput {
    fn from(content: ContentInput) -> Self {
        Self::Content(content)
    }
}

impl From<GenerateContentRequest> for GenerateContentInput {
    fn from(request: GenerateContentRequest) -> Self {
        Self::Request(request)
    }
}

/// Caller-facing countTokens request.
///
/// At most one of `contents` and `generate_content_request` may be set;
/// supplying both is rejected by [`format_count_tokens_input`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<Content>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_content_request: Option<GenerateContentRequest>,
}

/// Caller input for countTokens.
#[derive(Clone, Debug, PartialEq)]
pub enum CountTokensInput {
    /// Loose content: a string or a mixed part sequence
    Content(ContentInput),
    /// A structured countTokens request
    Request(CountTokensRequest),
}

impl<'a> From<&'a str> for CountTokensInput {
    fn from(text: &'a str) -> Self {
        Self::Content(text.into())
    }
}

impl From<String> for CountTokensInput {
    fn from(text: String) -> Self {
        Self::Content(text.into())
    }
}

impl From<Vec<crate::content::PartInput>> for CountTokensInput {
    fn from(parts: Vec<crate::content::PartInput>) -> Self {
        Self::Content(parts.into())
    }
}

impl From<Vec<crate::content::Part>> for CountTokensInput {
    fn from(parts: Vec<crate::content::Part>) -> Self {
        Self::Content(parts.into())
    }
}

impl From<ContentInput> for CountTokensInput {
    fn from(content: ContentInput) -> Self {
        Self::Content(content)
    }
}

impl From<CountTokensRequest> for CountTokensInput {
    fn from(request: CountTokensRequest) -> Self {
        Self::Request(request)
    }
}

/// Wire body for countTokens: model defaults and the selected contents
/// source, always nested under `generateContentRequest`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensBody {
    /// Qualified model name, set by the method layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub generate_content_request: GenerateContentRequest,
}

/// The canonical embedContent envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// Qualified model name, set for batched requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Caller input for embedContent.
#[derive(Clone, Debug, PartialEq)]
pub enum EmbedContentInput {
    /// Loose content: a string or a mixed part sequence
    Content(ContentInput),
    /// A structured embed request, passed through unchanged
    Request(EmbedContentRequest),
}

impl<'a> From<&'a str> for EmbedContentInput {
    fn from(text: &'a str) -> Self {
        Self::Content(text.into())
    }
}

impl From<String> for EmbedContentInput {
    fn from(text: String) -> Self {
        Self::Content(text.into())
    }
}

impl From<Vec<crate::content::PartInput>> for EmbedContentInput {
    fn from(parts: Vec<crate::content::PartInput>) -> Self {
        Self::Content(parts.into())
    }
}

impl From<Vec<crate::content::Part>> for EmbedContentInput {
    fn from(parts: Vec<crate::content::Part>) -> Self {
        Self::Content(parts.into())
    }
}

impl From<ContentInput> for EmbedContentInput {
    fn from(content: ContentInput) -> Self {
        Self::Content(content)
    }
}

impl From<EmbedContentRequest> for EmbedContentInput {
    fn from(request: EmbedContentRequest) -> Self {
        Self::Request(request)
    }
}

/// Wire body for batchEmbedContents.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BatchEmbedContentsRequest {
    pub requests: Vec<EmbedContentRequest>,
}

/// Formats caller input into a canonical generateContent envelope.
///
/// A structured request passes its `contents` through unchanged; loose
/// content is normalized into a one-element contents sequence. A present
/// system instruction is normalized so it always carries role `system`.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] when loose content normalization fails.
pub fn format_generate_content_input(
    input: impl Into<GenerateContentInput>,
) -> Result<GenerateContentRequest, Error> {
    let mut request = match input.into() {
        GenerateContentInput::Request(request) => request,
        GenerateContentInput::Content(content) => GenerateContentRequest {
            contents: vec![format_new_content(content)?],
            ..GenerateContentRequest::default()
        },
    };
    if let Some(instruction) = request.system_instruction.take() {
        request.system_instruction = Some(SystemInstruction::Content(format_system_instruction(
            instruction,
        )));
    }
    Ok(request)
}

/// Formats caller input plus model-level defaults into a countTokens body.
///
/// The result always nests under `generateContentRequest`, merging the model
/// defaults with whichever contents source was selected; request-level fields
/// win over model-level defaults on overlap.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] when both `contents` and
/// `generate_content_request` are supplied, or when loose content
/// normalization fails.
pub fn format_count_tokens_input(
    input: impl Into<CountTokensInput>,
    model_params: Option<&ModelParams>,
) -> Result<CountTokensBody, Error> {
    let defaults = model_params.cloned().unwrap_or_default();
    let mut formatted = GenerateContentRequest {
        model: defaults.model.as_deref().map(qualify_model_name),
        contents: Vec::new(),
        generation_config: defaults.generation_config,
        safety_settings: defaults.safety_settings,
        tools: defaults.tools,
        tool_config: defaults.tool_config,
        system_instruction: defaults
            .system_instruction
            .map(|instruction| SystemInstruction::Content(format_system_instruction(instruction))),
        cached_content: defaults.cached_content.and_then(|cached| cached.name),
    };

    match input.into() {
        CountTokensInput::Content(content) => {
            formatted.contents = vec![format_new_content(content)?];
        }
        CountTokensInput::Request(request) => {
            match (request.contents, request.generate_content_request) {
                (Some(_), Some(_)) => {
                    return Err(Error::InvalidRequest(
                        "a countTokens request must have one of `contents` or \
                         `generate_content_request`, not both"
                            .to_string(),
                    ));
                }
                (Some(contents), None) => formatted.contents = contents,
                (None, Some(overrides)) => formatted = merge_requests(formatted, overrides),
                (None, None) => {}
            }
        }
    }

    Ok(CountTokensBody {
        model: None,
        generate_content_request: formatted,
    })
}

/// Overlays a request onto model-level defaults, request fields winning.
fn merge_requests(
    defaults: GenerateContentRequest,
    overrides: GenerateContentRequest,
) -> GenerateContentRequest {
    GenerateContentRequest {
        model: overrides.model.or(defaults.model),
        contents: overrides.contents,
        generation_config: overrides.generation_config.or(defaults.generation_config),
        safety_settings: overrides.safety_settings.or(defaults.safety_settings),
        tools: overrides.tools.or(defaults.tools),
        tool_config: overrides.tool_config.or(defaults.tool_config),
        system_instruction: overrides
            .system_instruction
            .map(|instruction| SystemInstruction::Content(format_system_instruction(instruction)))
            .or(defaults.system_instruction),
        cached_content: overrides.cached_content.or(defaults.cached_content),
    }
}

/// Formats caller input into a canonical embedContent envelope.
///
/// Loose content is normalized and wrapped as `{ content }`; a structured
/// request passes through unchanged.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] when loose content normalization fails.
pub fn format_embed_content_input(
    input: impl Into<EmbedContentInput>,
) -> Result<EmbedContentRequest, Error> {
    match input.into() {
        EmbedContentInput::Content(content) => Ok(EmbedContentRequest {
            model: None,
            content: format_new_content(content)?,
            task_type: None,
            title: None,
        }),
        EmbedContentInput::Request(request) => Ok(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Part, PartInput, Role};
    use serde_json::json;

    #[test]
    fn test_format_generate_content_from_string() {
        let request = format_generate_content_input("What is this?").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{"parts": [{"text": "What is this?"}], "role": "user"}]
            })
        );
    }

    #[test]
    fn test_format_generate_content_passes_structured_contents_through() {
        let contents = vec![Content::user(vec![Part::text("already canonical")])];
        let request = format_generate_content_input(GenerateContentRequest {
            contents: contents.clone(),
            generation_config: Some(GenerationConfig {
                temperature: Some(0.2),
                ..GenerationConfig::default()
            }),
            ..GenerateContentRequest::default()
        })
        .unwrap();
        assert_eq!(request.contents, contents);
        assert_eq!(
            request.generation_config.unwrap().temperature,
            Some(0.2)
        );
    }

    #[test]
    fn test_format_generate_content_normalizes_system_instruction() {
        let request = format_generate_content_input(GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text("hello")])],
            system_instruction: Some("Be terse".into()),
            ..GenerateContentRequest::default()
        })
        .unwrap();

        let instruction = request.system_instruction.unwrap();
        assert_eq!(
            instruction,
            SystemInstruction::Content(Content::system(vec![Part::text("Be terse")]))
        );
        assert_eq!(
            serde_json::to_value(&instruction).unwrap(),
            json!({"parts": [{"text": "Be terse"}], "role": "system"})
        );
    }

    #[test]
    fn test_format_generate_content_rejects_mixed_parts() {
        let input: Vec<PartInput> = vec![
            "text".into(),
            Part::function_response("f", json!({})).into(),
        ];
        let error = format_generate_content_input(input).unwrap_err();
        assert!(matches!(error, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_format_count_tokens_from_string() {
        let body = format_count_tokens_input("count me", None).unwrap();
        assert!(body.model.is_none());
        let request = &body.generate_content_request;
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role, Some(Role::User));
        assert_eq!(request.contents[0].parts, vec![Part::text("count me")]);
    }

    #[test]
    fn test_format_count_tokens_rejects_both_sources() {
        let request = CountTokensRequest {
            contents: Some(vec![Content::user(vec![Part::text("a")])]),
            generate_content_request: Some(GenerateContentRequest {
                contents: vec![Content::user(vec![Part::text("b")])],
                ..GenerateContentRequest::default()
            }),
        };
        let error = format_count_tokens_input(request, None).unwrap_err();
        assert!(matches!(error, Error::InvalidRequest(_)));
        assert!(format!("{}", error).contains("not both"));
    }

    #[test]
    fn test_format_count_tokens_merges_model_params() {
        let params = ModelParams {
            model: Some("gemini-pro".to_string()),
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(64),
                ..GenerationConfig::default()
            }),
            system_instruction: Some("Be terse".into()),
            cached_content: Some(CachedContent {
                name: Some("cachedContents/xyz".to_string()),
            }),
            ..ModelParams::default()
        };
        let body = format_count_tokens_input("hello", Some(&params)).unwrap();
        let request = &body.generate_content_request;

        assert_eq!(request.model.as_deref(), Some("models/gemini-pro"));
        assert_eq!(
            request.generation_config.as_ref().unwrap().max_output_tokens,
            Some(64)
        );
        assert_eq!(request.cached_content.as_deref(), Some("cachedContents/xyz"));
        assert_eq!(
            request.system_instruction,
            Some(SystemInstruction::Content(Content::system(vec![
                Part::text("Be terse")
            ])))
        );
    }

    #[test]
    fn test_format_count_tokens_request_fields_win_over_defaults() {
        let params = ModelParams {
            generation_config: Some(GenerationConfig {
                temperature: Some(0.9),
                ..GenerationConfig::default()
            }),
            ..ModelParams::default()
        };
        let overrides = CountTokensRequest {
            contents: None,
            generate_content_request: Some(GenerateContentRequest {
                contents: vec![Content::user(vec![Part::text("from request")])],
                generation_config: Some(GenerationConfig {
                    temperature: Some(0.1),
                    ..GenerationConfig::default()
                }),
                ..GenerateContentRequest::default()
            }),
        };
        let body = format_count_tokens_input(overrides, Some(&params)).unwrap();
        let request = &body.generate_content_request;

        assert_eq!(
            request.generation_config.as_ref().unwrap().temperature,
            Some(0.1)
        );
        assert_eq!(request.contents[0].parts, vec![Part::text("from request")]);
    }

    #[test]
    fn test_format_count_tokens_contents_source_selected() {
        let contents = vec![Content::user(vec![Part::text("explicit contents")])];
        let request = CountTokensRequest {
            contents: Some(contents.clone()),
            generate_content_request: None,
        };
        let body = format_count_tokens_input(request, None).unwrap();
        assert_eq!(body.generate_content_request.contents, contents);
    }

    #[test]
    fn test_format_count_tokens_empty_request_keeps_empty_contents() {
        let body = format_count_tokens_input(CountTokensRequest::default(), None).unwrap();
        assert!(body.generate_content_request.contents.is_empty());
    }

    #[test]
    fn test_count_tokens_body_wire_nesting() {
        let mut body = format_count_tokens_input("hi", None).unwrap();
        body.model = Some("models/gemini-pro".to_string());
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "models/gemini-pro");
        assert_eq!(
            value["generateContentRequest"]["contents"][0]["parts"][0]["text"],
            "hi"
        );
    }

    #[test]
    fn test_format_embed_content_from_string() {
        let request = format_embed_content_input("embed me").unwrap();
        assert_eq!(request.content.role, Some(Role::User));
        assert_eq!(request.content.parts, vec![Part::text("embed me")]);
        assert!(request.task_type.is_none());
    }

    #[test]
    fn test_format_embed_content_passes_structured_through() {
        let structured = EmbedContentRequest {
            model: None,
            content: Content::user(vec![Part::text("doc body")]),
            task_type: Some(TaskType::RetrievalDocument),
            title: Some("doc title".to_string()),
        };
        let request = format_embed_content_input(structured.clone()).unwrap();
        assert_eq!(request, structured);
    }

    #[test]
    fn test_safety_setting_wire_strings() {
        let setting = SafetySetting {
            category: HarmCategory::HarmCategoryHarassment,
            threshold: HarmBlockThreshold::BlockOnlyHigh,
        };
        assert_eq!(
            serde_json::to_value(setting).unwrap(),
            json!({
                "category": "HARM_CATEGORY_HARASSMENT",
                "threshold": "BLOCK_ONLY_HIGH"
            })
        );
    }

    #[test]
    fn test_generation_config_skips_unset_fields() {
        let config = GenerationConfig {
            temperature: Some(0.5),
            ..GenerationConfig::default()
        };
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"temperature": 0.5})
        );
    }
}
