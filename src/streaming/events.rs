use serde_json::json;
use tracing::warn;

use crate::dispatch::{ResultKind, UpstreamResult};
use crate::models::gemini::InlineData;
use crate::transform::{IMAGE_LEAD_IN, decode_image, estimate_usage};

/// Final frame of every synthesized stream.
pub const STREAM_TERMINATOR: &str = "data: [DONE]\n\n";

/// Synthesizes the full ordered SSE frame sequence for one upstream result.
///
/// Text results are replayed one character at a time to emulate token-level
/// streaming over a single synchronous upstream reply. The sequence always
/// ends with one finish frame and the `[DONE]` sentinel; a failure while
/// building frames is converted to an in-band error frame so the stream
/// still closes cleanly.
pub fn synthesize_frames(result: &UpstreamResult, prompt_len: usize) -> Vec<String> {
    let mut frames = Vec::new();

    match result.kind {
        ResultKind::Text => {
            for ch in result.content.chars() {
                frames.push(text_delta_frame(&ch.to_string()));
            }
        }
        ResultKind::Image => match decode_image(&result.content) {
            Ok(inline_data) => {
                frames.push(text_delta_frame(IMAGE_LEAD_IN));
                frames.push(inline_data_frame(&inline_data));
            }
            Err(e) => {
                warn!("Stream synthesis failed: {e}");
                frames.push(error_frame(&e.to_string()));
                frames.push(STREAM_TERMINATOR.to_string());
                return frames;
            }
        },
    }

    frames.push(finish_frame(prompt_len, result.content.len()));
    frames.push(STREAM_TERMINATOR.to_string());
    frames
}

fn frame(data: &serde_json::Value) -> String {
    format!("data: {data}\n\n")
}

fn text_delta_frame(text: &str) -> String {
    frame(&json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "index": 0
        }]
    }))
}

fn inline_data_frame(inline_data: &InlineData) -> String {
    frame(&json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"inlineData": {
                    "mimeType": inline_data.mime_type,
                    "data": inline_data.data
                }}]
            },
            "index": 0
        }]
    }))
}

fn finish_frame(prompt_len: usize, output_len: usize) -> String {
    let usage = estimate_usage(prompt_len, output_len);
    frame(&json!({
        "candidates": [{
            "content": {"role": "model", "parts": []},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {
            "promptTokenCount": usage.prompt_token_count,
            "candidatesTokenCount": usage.candidates_token_count,
            "totalTokenCount": usage.total_token_count
        }
    }))
}

fn error_frame(message: &str) -> String {
    frame(&json!({
        "error": {
            "code": 502,
            "status": "UNAVAILABLE",
            "message": message
        }
    }))
}
