use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info};

use crate::backend::{ChatBackend, CompletionFuture};
use crate::config::UpstreamConfig;
use crate::error::{RelayError, Result};

/// HTTP implementation of [`ChatBackend`] over an OpenAI-compatible endpoint.
pub struct HttpChatClient {
    client: Client,
    config: UpstreamConfig,
}

impl HttpChatClient {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| {
                RelayError::InternalError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }
}

impl ChatBackend for HttpChatClient {
    fn complete(&self, model: &str, credential: &str, body: Bytes) -> CompletionFuture {
        let url = format!("{}{}", self.config.endpoint, self.config.chat_path);
        let client = self.client.clone();
        let model = model.to_string();
        let credential = credential.to_string();

        Box::pin(async move { Self::complete_impl(url, model, credential, body, client).await })
    }

    fn name(&self) -> &str {
        "upstream"
    }
}

impl HttpChatClient {
    async fn complete_impl(
        url: String,
        model: String,
        credential: String,
        body: Bytes,
        client: Client,
    ) -> Result<Bytes> {
        info!("Sending {} bytes to {} (model: {})", body.len(), url, model);
        debug!("Outbound payload: {}", String::from_utf8_lossy(&body));

        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {credential}"))
            .body(body)
            .send()
            .await
            .map_err(|e| RelayError::Upstream {
                model: model.clone(),
                detail: format!("Request failed: {e}"),
            })?;

        let status = response.status();
        info!("Upstream responded with status: {status}");

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RelayError::Upstream {
                model,
                detail: format!("{status}: {error_body}"),
            });
        }

        let payload = response.bytes().await.map_err(|e| RelayError::Upstream {
            model,
            detail: format!("Failed to read response body: {e}"),
        })?;
        debug!("Inbound payload: {}", String::from_utf8_lossy(&payload));

        Ok(payload)
    }
}
