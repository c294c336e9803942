use base64::Engine as _;
use tracing::warn;

use crate::dispatch::{ResultKind, UpstreamResult};
use crate::error::{RelayError, Result};
use crate::models::gemini::{Candidate, Content, GenerateResponse, InlineData, Part, UsageMetadata};
use crate::transform::parse_data_uri;

/// Text part emitted ahead of a generated image.
pub const IMAGE_LEAD_IN: &str = "Here is the generated image:";

/// Substituted when a stored image result can no longer be decoded.
pub const IMAGE_FAILED_MARKER: &str = "[image generation failed]";

/// Rough token estimation (4 chars ≈ 1 token).
pub fn estimate_tokens(text_len: usize) -> u32 {
    (text_len / 4).max(1) as u32
}

pub fn estimate_usage(prompt_len: usize, output_len: usize) -> UsageMetadata {
    let prompt = estimate_tokens(prompt_len);
    let candidates = estimate_tokens(output_len);
    UsageMetadata {
        prompt_token_count: Some(prompt),
        candidates_token_count: Some(candidates),
        total_token_count: Some(prompt + candidates),
    }
}

/// Re-decodes an image result's data-URI, validating the base64 payload.
pub fn decode_image(uri: &str) -> Result<InlineData> {
    let inline = parse_data_uri(uri)?;
    base64::engine::general_purpose::STANDARD
        .decode(&inline.data)
        .map_err(|e| RelayError::InvalidMediaEncoding(format!("bad base64 payload: {e}")))?;
    Ok(inline)
}

/// Caller-format parts for an upstream result.
///
/// An image result whose data-URI fails to re-decode degrades to a fixed
/// failure marker instead of raising.
pub fn result_parts(result: &UpstreamResult) -> Vec<Part> {
    match result.kind {
        ResultKind::Text => vec![Part::Text {
            text: result.content.clone(),
        }],
        ResultKind::Image => match decode_image(&result.content) {
            Ok(inline_data) => vec![
                Part::Text {
                    text: IMAGE_LEAD_IN.to_string(),
                },
                Part::InlineData { inline_data },
            ],
            Err(e) => {
                warn!("Image result no longer decodes: {e}");
                vec![Part::Text {
                    text: IMAGE_FAILED_MARKER.to_string(),
                }]
            }
        },
    }
}

/// Shapes an upstream result into the caller's batch response.
pub fn normalize_batch(result: &UpstreamResult, prompt_len: usize) -> GenerateResponse {
    let parts = result_parts(result);

    GenerateResponse {
        candidates: vec![Candidate {
            content: Content {
                role: "model".to_string(),
                parts,
            },
            finish_reason: Some("STOP".to_string()),
            index: 0,
        }],
        usage_metadata: Some(estimate_usage(prompt_len, result.content.len())),
    }
}
