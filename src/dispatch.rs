use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::ChatBackend;
use crate::error::{RelayError, Result};
use crate::models::gemini::Content;
use crate::models::openai::{ChatResponse, ContentPart, MessageContent};
use crate::transform::{Dialect, build_chat_request, format_data_uri, is_data_uri};

/// Substituted when a well-formed upstream reply carries no content at all.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "(no content returned)";

/// The ordered pair of model identifiers used for dispatch.
///
/// `primary` is attempted first; `fallback` is used only after a classified
/// quota failure on `primary`. Passed explicitly so tests and requests can
/// override it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelTier {
    pub primary: String,
    pub fallback: String,
}

/// What kind of payload the upstream produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Image,
    Text,
}

/// The distilled outcome of one dispatch: an image data-URI or reply text.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResult {
    pub kind: ResultKind,
    pub content: String,
}

/// Classifier deciding whether an upstream failure is a quota exhaustion.
pub type QuotaClassifier = fn(&str) -> bool;

const QUOTA_PHRASES: &[&str] = &[
    "quota exhausted",
    "insufficient quota",
    "free quota",
    "rate limit",
    "daily limit",
];

/// Phrase-list quota classifier: case-insensitive containment of any known
/// quota/rate-limit phrase in the upstream error text.
pub fn default_quota_classifier(detail: &str) -> bool {
    let lowered = detail.to_lowercase();
    QUOTA_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Issues upstream calls with a single bounded fallback retry.
pub struct Dispatcher {
    backend: Arc<dyn ChatBackend>,
    dialect: Dialect,
    classifier: QuotaClassifier,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ChatBackend>, dialect: Dialect) -> Self {
        Self {
            backend,
            dialect,
            classifier: default_quota_classifier,
        }
    }

    /// Replace the quota classifier (used by tests and dialect profiles).
    pub fn with_classifier(mut self, classifier: QuotaClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Dispatches a window upstream, retrying once on the fallback tier if
    /// the primary tier fails with a classified quota error.
    pub async fn dispatch(
        &self,
        window: &[Content],
        credential: &str,
        tiers: &ModelTier,
    ) -> Result<UpstreamResult> {
        if credential.is_empty() {
            return Err(RelayError::MissingCredential);
        }

        match self.attempt(&tiers.primary, credential, window).await {
            Ok(result) => Ok(result),
            Err(RelayError::Upstream { model, detail }) if (self.classifier)(&detail) => {
                warn!(
                    primary = %model,
                    fallback = %tiers.fallback,
                    "Primary tier quota exhausted, retrying on fallback"
                );
                // A failure on the fallback tier is terminal, quota or not.
                self.attempt(&tiers.fallback, credential, window).await
            }
            Err(e) => Err(e),
        }
    }

    async fn attempt(
        &self,
        model: &str,
        credential: &str,
        window: &[Content],
    ) -> Result<UpstreamResult> {
        let request = build_chat_request(window, model, self.dialect)?;
        let body = Bytes::from(serde_json::to_vec(&request)?);

        info!(
            backend = self.backend.name(),
            model,
            bytes = body.len(),
            "Dispatching upstream request"
        );

        let payload = self.backend.complete(model, credential, body).await?;

        info!(model, bytes = payload.len(), "Upstream reply received");

        let response: ChatResponse =
            serde_json::from_slice(&payload).map_err(|e| RelayError::Upstream {
                model: model.to_string(),
                detail: format!("Unparseable upstream payload: {e}"),
            })?;

        Ok(collect_result(&response))
    }
}

/// Distills an upstream reply into a single result.
///
/// The first inline image found wins over any co-present text; otherwise all
/// non-empty text is concatenated; an empty-but-well-formed reply yields the
/// placeholder rather than an error.
pub fn collect_result(response: &ChatResponse) -> UpstreamResult {
    let mut image: Option<String> = None;
    let mut text = String::new();

    if let Some(choice) = response.choices.first() {
        match &choice.message.content {
            Some(MessageContent::Text(t)) => scan_text(t, &mut image, &mut text),
            Some(MessageContent::Parts(parts)) => {
                for part in parts {
                    scan_part(part, &mut image, &mut text);
                }
            }
            None => {}
        }

        for part in &choice.message.images {
            scan_part(part, &mut image, &mut text);
        }
    }

    if let Some(content) = image {
        UpstreamResult {
            kind: ResultKind::Image,
            content,
        }
    } else if !text.is_empty() {
        UpstreamResult {
            kind: ResultKind::Text,
            content: text,
        }
    } else {
        UpstreamResult {
            kind: ResultKind::Text,
            content: EMPTY_REPLY_PLACEHOLDER.to_string(),
        }
    }
}

fn scan_part(part: &ContentPart, image: &mut Option<String>, text: &mut String) {
    match part {
        ContentPart::ImageUrl { image_url, .. } => {
            if image.is_none() {
                *image = Some(image_url.url.clone());
            }
        }
        ContentPart::InlineData { inline_data } => {
            if image.is_none() {
                *image = Some(format_data_uri(&inline_data.mime_type, &inline_data.data));
            }
        }
        ContentPart::TypedText { text: t, .. } | ContentPart::BareText { text: t } => {
            scan_text(t, image, text);
        }
        ContentPart::Other(_) => {}
    }
}

fn scan_text(t: &str, image: &mut Option<String>, text: &mut String) {
    if is_data_uri(t) {
        if image.is_none() {
            *image = Some(t.to_string());
        }
    } else {
        text.push_str(t);
    }
}
