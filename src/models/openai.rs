use serde::{Deserialize, Serialize};

use crate::models::gemini::InlineData;

/// OpenAI-style Chat Completions Request (upstream backend format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant" ("model" is preserved by the inline dialect)
    pub role: String,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single upstream content part, covering both backend dialects.
///
/// Variant order matters for `#[serde(untagged)]` decoding: the typed
/// variants must be tried before the bare ones, and the catch-all last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    /// `{"type": "image_url", "image_url": {"url": "data:..."}}`
    ImageUrl {
        #[serde(rename = "type")]
        kind: String,
        image_url: ImageUrl,
    },
    /// `{"type": "text", "text": "..."}`
    TypedText {
        #[serde(rename = "type")]
        kind: String,
        text: String,
    },
    /// `{"inlineData": {"mimeType": "...", "data": "..."}}`
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// `{"text": "..."}`
    BareText { text: String },
    /// Anything the backend invents that we do not recognize
    Other(serde_json::Value),
}

impl ContentPart {
    pub fn typed_text(text: impl Into<String>) -> Self {
        ContentPart::TypedText {
            kind: "text".to_string(),
            text: text.into(),
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            kind: "image_url".to_string(),
            image_url: ImageUrl { url: url.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// OpenAI-style Chat Completions Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,

    /// Either plain text or an array of parts; absent on pure-image replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,

    /// Some multimodal backends return generated images out-of-band here
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ContentPart>,
}
