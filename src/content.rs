//! Content model and input normalization.
//!
//! The API accepts conversation turns as role-tagged groups of [`Part`]s.
//! Callers, however, usually hold something looser: a plain string, or a
//! mixed list of strings and typed parts. The functions in this module turn
//! those loose inputs into exactly one canonical [`Content`], assigning the
//! conversational role from the part kinds and rejecting combinations the
//! server would refuse, before any network traffic happens.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::Error;

/// Role of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Content supplied by the caller
    User,
    /// Content produced by the model (responses only)
    Model,
    /// System instruction content
    System,
    /// Function responses returned to the model
    Function,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
            Self::System => write!(f, "system"),
            Self::Function => write!(f, "function"),
        }
    }
}

/// Inline binary data with its MIME type, base64-encoded as the API expects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// MIME type of the payload (e.g. `image/jpeg`)
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// A function call requested by the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: serde_json::Value,
}

/// The caller's response to a function call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

/// One atomic unit of multimodal content.
///
/// Exactly one variant is set per instance; the externally-tagged serde
/// representation matches the wire format (`{"text": ...}`,
/// `{"inlineData": {...}}`, `{"functionCall": {...}}`,
/// `{"functionResponse": {...}}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    /// Plain text
    Text(String),
    /// Inline binary data (images, audio, ...)
    InlineData(Blob),
    /// A function call emitted by the model
    FunctionCall(FunctionCall),
    /// A function response supplied by the caller
    FunctionResponse(FunctionResponse),
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates an inline-data part from an already base64-encoded payload.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData(Blob {
            mime_type: mime_type.into(),
            data: data.into(),
        })
    }

    /// Creates an inline-data part from raw bytes, base64-encoding them.
    pub fn inline_data_from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::InlineData(Blob {
            mime_type: mime_type.into(),
            data: BASE64_STANDARD.encode(bytes),
        })
    }

    /// Creates a function-call part.
    pub fn function_call(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self::FunctionCall(FunctionCall {
            name: name.into(),
            args,
        })
    }

    /// Creates a function-response part.
    pub fn function_response(name: impl Into<String>, response: serde_json::Value) -> Self {
        Self::FunctionResponse(FunctionResponse {
            name: name.into(),
            response,
        })
    }

    /// Whether this part is a function response.
    ///
    /// This is the predicate the normalizer partitions on: function responses
    /// are the only part kind that must be sent under the `function` role.
    #[must_use]
    pub const fn is_function_response(&self) -> bool {
        matches!(self, Self::FunctionResponse(_))
    }

    /// Returns the text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A role-tagged ordered group of parts, the unit exchanged per turn.
///
/// `role` is optional on input (the formatters fill it in); every `Content`
/// produced by [`format_new_content`] carries a role and a non-empty `parts`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Content {
    /// Creates a content with an explicit role.
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            parts,
            role: Some(role),
        }
    }

    /// Creates a user-role content.
    pub fn user(parts: Vec<Part>) -> Self {
        Self::new(Role::User, parts)
    }

    /// Creates a system-role content.
    pub fn system(parts: Vec<Part>) -> Self {
        Self::new(Role::System, parts)
    }
}

/// One element of a mixed caller-supplied part sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum PartInput {
    /// A bare string, promoted to a text part
    Text(String),
    /// An already-typed part, passed through unchanged
    Part(Part),
}

impl From<&str> for PartInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PartInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Part> for PartInput {
    fn from(part: Part) -> Self {
        Self::Part(part)
    }
}

/// Loosely-typed caller input accepted wherever the API takes content.
///
/// Dispatch is by constructor rather than runtime shape-sniffing; the
/// string-before-sequence disambiguation order of the wire protocol is
/// preserved by the variant a caller reaches for.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentInput {
    /// A single prompt string
    Text(String),
    /// An ordered mix of strings and typed parts
    Parts(Vec<PartInput>),
}

impl From<&str> for ContentInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ContentInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<PartInput>> for ContentInput {
    fn from(parts: Vec<PartInput>) -> Self {
        Self::Parts(parts)
    }
}

impl From<Vec<Part>> for ContentInput {
    fn from(parts: Vec<Part>) -> Self {
        Self::Parts(parts.into_iter().map(PartInput::Part).collect())
    }
}

/// Caller input for a system instruction: a bare string, a single part, or a
/// full content.
///
/// After formatting, the value is always the `Content` variant with role
/// `system`; the untagged representation keeps the wire shape identical to a
/// plain content object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemInstruction {
    /// A bare instruction string
    Text(String),
    /// A single part
    Part(Part),
    /// A full content, with or without a role
    Content(Content),
}

impl From<&str> for SystemInstruction {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for SystemInstruction {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Part> for SystemInstruction {
    fn from(part: Part) -> Self {
        Self::Part(part)
    }
}

impl From<Content> for SystemInstruction {
    fn from(content: Content) -> Self {
        Self::Content(content)
    }
}

/// Normalizes loose caller input into exactly one canonical [`Content`].
///
/// Strings become a single text part; sequences are mapped element-wise with
/// order preserved. The resulting parts are partitioned on
/// [`Part::is_function_response`]: function responses get role `function`,
/// everything else role `user`.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] if function-response parts are mixed
/// with any other part kind in one message, or if no parts were supplied.
pub fn format_new_content(input: impl Into<ContentInput>) -> Result<Content, Error> {
    let parts = match input.into() {
        ContentInput::Text(text) => vec![Part::Text(text)],
        ContentInput::Parts(items) => items
            .into_iter()
            .map(|item| match item {
                PartInput::Text(text) => Part::Text(text),
                PartInput::Part(part) => part,
            })
            .collect(),
    };
    assign_role_and_validate(parts)
}

/// Partitions parts by kind and assigns the conversational role.
///
/// The partition predicate, not first-element inspection, decides the role:
/// a request that the server would reject as semantically invalid fails
/// here, locally.
fn assign_role_and_validate(parts: Vec<Part>) -> Result<Content, Error> {
    let (function_parts, user_parts): (Vec<Part>, Vec<Part>) = parts
        .into_iter()
        .partition(|part| part.is_function_response());

    match (user_parts.is_empty(), function_parts.is_empty()) {
        (false, false) => Err(Error::InvalidRequest(
            "within a single message, a function response cannot be mixed with other part types"
                .to_string(),
        )),
        (true, true) => Err(Error::InvalidRequest(
            "no content provided for the message".to_string(),
        )),
        (false, true) => Ok(Content::new(Role::User, user_parts)),
        (true, false) => Ok(Content::new(Role::Function, function_parts)),
    }
}

/// Normalizes a system instruction into a role-`system` [`Content`].
///
/// A bare string or single part is promoted; a content missing a role is
/// assigned `system`; a content with an explicit role passes through
/// unchanged.
#[must_use]
pub fn format_system_instruction(input: SystemInstruction) -> Content {
    match input {
        SystemInstruction::Text(text) => Content::system(vec![Part::Text(text)]),
        SystemInstruction::Part(part) => Content::system(vec![part]),
        SystemInstruction::Content(content) => {
            if content.role.is_none() {
                Content {
                    role: Some(Role::System),
                    parts: content.parts,
                }
            } else {
                content
            }
        }
    }
}
