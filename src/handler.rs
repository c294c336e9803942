use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Response, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::backend::ChatBackend;
use crate::config::RelayConfig;
use crate::dispatch::{Dispatcher, ResultKind, UpstreamResult};
use crate::error::{RelayError, Result};
use crate::models::gemini::{Content, GenerateRequest, InlineData, Part};
use crate::streaming::{paced_stream, synthesize_frames};
use crate::transform::{extract_window, normalize_batch, parse_data_uri, window_text_len};
use crate::validation::validate_generate_request;

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub config: RelayConfig,
}

impl AppState {
    pub fn new(backend: Arc<dyn ChatBackend>, config: RelayConfig) -> Self {
        let dispatcher = Dispatcher::new(backend, config.upstream.dialect);
        Self { dispatcher, config }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1beta/models/{model_call}", post(handle_model_call))
        .route("/api/generate-image", post(handle_generate_image))
        .with_state(state)
}

/// Splits a "model:action" path segment and selects batch vs stream mode.
fn parse_model_call(model_call: &str) -> Result<(&str, bool)> {
    let (model, action) = model_call.split_once(':').ok_or_else(|| {
        RelayError::InvalidRequest(format!("Expected model:action, got: {model_call}"))
    })?;

    match action {
        "generateContent" => Ok((model, false)),
        "streamGenerateContent" => Ok((model, true)),
        other => Err(RelayError::InvalidRequest(format!(
            "Unknown action: {other}"
        ))),
    }
}

/// Credential is taken from `x-goog-api-key` or an Authorization bearer.
fn extract_credential(headers: &HeaderMap) -> String {
    if let Some(key) = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok())
        && !key.is_empty()
    {
        return key.to_string();
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Single handler behind both `generateContent` and `streamGenerateContent`.
///
/// The two routes (and both upstream dialects) share one translation core;
/// only the response assembly differs.
pub async fn handle_model_call(
    State(state): State<Arc<AppState>>,
    Path(model_call): Path<String>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> axum::response::Response {
    let (requested_model, streaming) = match parse_model_call(&model_call) {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };

    info!(
        model = requested_model,
        streaming,
        messages = request.contents.len(),
        "Inbound generation request"
    );

    match process(&state, &headers, &request, streaming).await {
        Ok(response) => response,
        Err(e) => {
            error!("Request failed: {e}");
            e.into_response()
        }
    }
}

async fn process(
    state: &AppState,
    headers: &HeaderMap,
    request: &GenerateRequest,
    streaming: bool,
) -> Result<axum::response::Response> {
    validate_generate_request(request)?;

    let credential = extract_credential(headers);
    let window = extract_window(&request.contents)?;
    let prompt_len = window_text_len(window);

    // Dispatch completes before any stream opens, so failures here surface
    // as structured JSON on both routes.
    let result = state
        .dispatcher
        .dispatch(window, &credential, &state.config.models)
        .await?;

    if streaming {
        let frames = synthesize_frames(&result, prompt_len);
        let body = Body::from_stream(paced_stream(frames, state.config.stream.char_delay()));

        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/event-stream")
            .header("Cache-Control", "no-cache")
            .header("Connection", "keep-alive")
            .body(body)
            .unwrap())
    } else {
        Ok(Json(normalize_batch(&result, prompt_len)).into_response())
    }
}

/// Simplified image-generation façade request.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenRequest {
    pub prompt: String,

    /// Reference images, as data-URIs or raw base64 PNG payloads
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub credential: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ImageGenResponse {
    Generated {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    Failed {
        error: String,
    },
}

/// Thin façade over the same dispatcher: one user message, image-only reply.
pub async fn handle_generate_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ImageGenRequest>,
) -> axum::response::Response {
    let request_id = Uuid::new_v4();
    info!(%request_id, images = request.images.len(), "Inbound image generation request");

    let credential = request
        .credential
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| extract_credential(&headers));

    match facade_dispatch(state.as_ref(), request, &credential).await {
        Ok(UpstreamResult {
            kind: ResultKind::Image,
            content,
        }) => Json(ImageGenResponse::Generated { image_url: content }).into_response(),
        Ok(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ImageGenResponse::Failed {
                error: "Upstream returned no image".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(%request_id, "Image generation failed: {e}");
            (
                e.status_code(),
                Json(ImageGenResponse::Failed {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn facade_dispatch(
    state: &AppState,
    request: ImageGenRequest,
    credential: &str,
) -> Result<UpstreamResult> {
    let mut parts = vec![Part::Text {
        text: request.prompt,
    }];

    for image in &request.images {
        let inline_data = if image.starts_with("data:") {
            parse_data_uri(image)?
        } else {
            InlineData {
                mime_type: "image/png".to_string(),
                data: image.clone(),
            }
        };
        parts.push(Part::InlineData { inline_data });
    }

    let window = vec![Content {
        role: "user".to_string(),
        parts,
    }];

    state
        .dispatcher
        .dispatch(&window, credential, &state.config.models)
        .await
}
