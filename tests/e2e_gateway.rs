use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gemini_relay::client::HttpChatClient;
use gemini_relay::config::{RelayConfig, ServerConfig, StreamConfig, UpstreamConfig};
use gemini_relay::dispatch::ModelTier;
use gemini_relay::handler::{AppState, router};
use gemini_relay::transform::Dialect;

/// Boots the relay against a mock upstream and returns its base URL.
async fn spawn_gateway(upstream_uri: String) -> String {
    let config = RelayConfig {
        server: ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
        },
        upstream: UpstreamConfig {
            endpoint: upstream_uri,
            chat_path: "/v1/chat/completions".to_string(),
            dialect: Dialect::OpenAi,
        },
        models: ModelTier {
            primary: "free-tier".to_string(),
            fallback: "paid-tier".to_string(),
        },
        stream: StreamConfig { char_delay_ms: 0 },
    };

    let backend = Arc::new(HttpChatClient::new(config.upstream.clone()).unwrap());
    let state = Arc::new(AppState::new(backend, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    format!("http://{addr}")
}

fn text_success(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": text}}]
    }))
}

fn simple_request() -> serde_json::Value {
    serde_json::json!({
        "contents": [{"role": "user", "parts": [{"text": "hi"}]}]
    })
}

#[tokio::test]
async fn test_batch_route_end_to_end() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(text_success("hello"))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_gateway(upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/v1beta/models/gemini-pro:generateContent"))
        .header("x-goog-api-key", "test-key")
        .json(&simple_request())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["candidates"][0]["content"]["parts"][0]["text"], "hello");
    assert_eq!(json["candidates"][0]["finishReason"], "STOP");
}

#[tokio::test]
async fn test_stream_route_replays_reply_and_terminates() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(text_success("AB"))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_gateway(upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(format!(
            "{base}/v1beta/models/gemini-pro:streamGenerateContent"
        ))
        .header("x-goog-api-key", "test-key")
        .json(&simple_request())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );

    let body = response.text().await.unwrap();
    let frames: Vec<&str> = body.split("\n\n").filter(|f| !f.is_empty()).collect();

    assert_eq!(frames.len(), 4);
    assert!(frames[0].contains(r#""text":"A""#));
    assert!(frames[1].contains(r#""text":"B""#));
    assert!(frames[2].contains(r#""finishReason":"STOP""#));
    assert_eq!(frames[3], "data: [DONE]");
}

#[tokio::test]
async fn test_missing_credential_is_401_before_any_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_success("nope"))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_gateway(upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/v1beta/models/gemini-pro:generateContent"))
        .json(&simple_request())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["error"]["status"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_empty_contents_is_400_before_any_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_success("nope"))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_gateway(upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/v1beta/models/gemini-pro:generateContent"))
        .header("x-goog-api-key", "test-key")
        .json(&serde_json::json!({"contents": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["error"]["status"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_unknown_action_is_400() {
    let upstream = MockServer::start().await;
    let base = spawn_gateway(upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/v1beta/models/gemini-pro:countTokens"))
        .header("x-goog-api-key", "test-key")
        .json(&simple_request())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_image_facade_returns_image_url() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": [
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,QUJD"}}
                ]
            }}]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_gateway(upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/generate-image"))
        .json(&serde_json::json!({
            "prompt": "a cat wearing a hat",
            "credential": "test-key"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["imageUrl"], "data:image/png;base64,QUJD");
}

#[tokio::test]
async fn test_image_facade_text_reply_is_an_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(text_success("I cannot draw that"))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_gateway(upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/generate-image"))
        .json(&serde_json::json!({
            "prompt": "a cat",
            "credential": "test-key"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);

    let json: serde_json::Value = response.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("no image"));
}

#[tokio::test]
async fn test_upstream_failure_surfaces_as_bad_gateway() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend offline"))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_gateway(upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/v1beta/models/gemini-pro:generateContent"))
        .header("x-goog-api-key", "test-key")
        .json(&simple_request())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);

    let json: serde_json::Value = response.json().await.unwrap();
    assert!(
        json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("backend offline")
    );
}
