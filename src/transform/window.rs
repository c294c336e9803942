use crate::error::{RelayError, Result};
use crate::models::gemini::{Content, Part};

/// Extracts the conversational window to submit upstream.
///
/// The window ends at the most recent `user` message and begins at the most
/// recent `model` message before it (or the start of history if none exists).
/// Bounding the payload to "the last turn plus its immediate prior assistant
/// context" is a cost and latency control, not a correctness requirement.
pub fn extract_window(history: &[Content]) -> Result<&[Content]> {
    let user_idx = history
        .iter()
        .rposition(|m| m.role == "user")
        .ok_or(RelayError::NoUserMessage)?;

    let start = history[..user_idx]
        .iter()
        .rposition(|m| m.role == "model")
        .unwrap_or(0);

    // The slice always includes the user message, so it is never empty.
    Ok(&history[start..=user_idx])
}

/// Total byte length of text carried by a window, used for token estimates.
pub fn window_text_len(window: &[Content]) -> usize {
    window
        .iter()
        .flat_map(|content| content.parts.iter())
        .map(|part| match part {
            Part::Text { text } => text.len(),
            Part::InlineData { .. } => 0,
        })
        .sum()
}
