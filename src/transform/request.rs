use tracing::debug;

use crate::error::{RelayError, Result};
use crate::models::gemini::Content;
use crate::models::openai::{ChatMessage, ChatRequest, MessageContent};
use crate::transform::{Dialect, encode_part, upstream_role};

/// Builds the upstream chat request for a conversation window.
///
/// Messages whose parts are all filtered away are skipped so that no message
/// ever reaches the backend with an empty part list.
pub fn build_chat_request(window: &[Content], model: &str, dialect: Dialect) -> Result<ChatRequest> {
    let mut messages = Vec::with_capacity(window.len());

    for content in window {
        let role = upstream_role(&content.role, dialect)?;

        if content.parts.is_empty() {
            debug!(role, "Skipping message with no parts");
            continue;
        }

        let parts = content
            .parts
            .iter()
            .map(|part| encode_part(part, dialect))
            .collect();

        messages.push(ChatMessage {
            role: role.to_string(),
            content: MessageContent::Parts(parts),
        });
    }

    if messages.is_empty() {
        return Err(RelayError::InvalidRequest(
            "Conversation window is empty after filtering".to_string(),
        ));
    }

    Ok(ChatRequest {
        model: model.to_string(),
        messages,
    })
}
