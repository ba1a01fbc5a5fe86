// Provider clients over real HTTP: auth placement, status mapping, body handling.

use serde_json::json;
use std::time::Duration;
use storyjudge_core::model::clients::{AnthropicClient, GeminiClient, OpenAIClient};
use storyjudge_core::model::{
    FailureClass, GenerativeModel, KeyRotation, ModelAdapter, ModelError, ProviderClient,
    RetryPolicy,
};
use storyjudge_core::{ChatMessage, Conversation};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-pro:generateContent";

fn judging() -> Conversation {
    Conversation::new(vec![
        ChatMessage::system("Rate the story from 1 to 5."),
        ChatMessage::user("The dragon slept."),
    ])
}

fn timeout() -> Duration {
    Duration::from_secs(5)
}

fn adapter<C: ProviderClient>(client: C, model: &str, keys: &str) -> ModelAdapter<C> {
    ModelAdapter::new(client, model, KeyRotation::from_csv(keys).expect("keys"))
        .with_retry(RetryPolicy::new(5, Duration::ZERO))
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn gemini_rotates_key_after_http_429() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(GEMINI_PATH))
        .and(matchers::query_param("key", "g0"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "status": "RESOURCE_EXHAUSTED" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(GEMINI_PATH))
        .and(matchers::query_param("key", "g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(" 4\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(server.uri(), timeout()).expect("client");
    let model = adapter(client, "gemini-2.5-pro", "g0,g1");

    assert_eq!(model.generate(&judging()).await.expect("second key"), "4");
    assert_eq!(model.keys().index(), 1);
}

#[tokio::test]
async fn gemini_block_reason_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(server.uri(), timeout()).expect("client");
    let err = adapter(client, "gemini-2.5-pro", "g0")
        .generate(&judging())
        .await
        .expect_err("blocked");

    match err {
        ModelError::Provider { source, .. } => {
            assert_eq!(source.class, FailureClass::Fatal);
            assert_eq!(source.message, "SAFETY");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn non_json_body_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(server.uri(), timeout()).expect("client");
    let err = adapter(client, "gemini-2.5-pro", "g0")
        .generate(&judging())
        .await
        .expect_err("not json");

    assert!(matches!(
        err,
        ModelError::Provider { ref source, .. } if source.message.contains("unexpected response body")
    ));
}

#[tokio::test]
async fn anthropic_overload_is_retried_with_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/v1/messages"))
        .and(matchers::header("x-api-key", "a0"))
        .and(matchers::header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error" }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/v1/messages"))
        .and(matchers::header("x-api-key", "a0"))
        .and(matchers::header("anthropic-version", "2023-06-01"))
        .and(matchers::body_partial_json(json!({
            "system": "Rate the story from 1 to 5.",
            "max_tokens": 4096
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "{\"score\": 5}" }],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new(server.uri(), timeout()).expect("client");
    let reply = adapter(client, "claude-sonnet-4", "a0")
        .generate(&judging())
        .await
        .expect("retried");

    assert_eq!(reply, "{\"score\": 5}");
}

#[tokio::test]
async fn openai_unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/v1/chat/completions"))
        .and(matchers::header("authorization", "Bearer o0"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new(server.uri(), timeout()).expect("client");
    let err = adapter(client, "gpt-4o", "o0")
        .generate(&judging())
        .await
        .expect_err("unauthorized");

    assert!(matches!(err, ModelError::Configuration { .. }));
}

#[tokio::test]
async fn openai_reply_is_read_from_first_choice() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/v1/chat/completions"))
        .and(matchers::header("authorization", "Bearer o0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Score: 3" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new(server.uri(), timeout()).expect("client");
    let reply = adapter(client, "gpt-4o", "o0")
        .generate(&judging())
        .await
        .expect("reply");

    assert_eq!(reply, "Score: 3");
}

/// Reads one full HTTP request (headers plus Content-Length body) and
/// answers with `response` before closing the connection.
async fn answer_next(listener: &TcpListener, response: &[u8]) {
    let (mut socket, _) = listener.accept().await.expect("accept");
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.expect("read");
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let body_len = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    socket.write_all(response).await.expect("write");
    socket.shutdown().await.ok();
}

#[tokio::test]
async fn truncated_body_is_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let good = gemini_reply("4").to_string();
    let server = tokio::spawn(async move {
        answer_next(
            &listener,
            b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n{\"candidates\":[",
        )
        .await;
        let full = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{good}",
            good.len()
        );
        answer_next(&listener, full.as_bytes()).await;
    });

    let client = GeminiClient::new(format!("http://{addr}"), timeout()).expect("client");
    let reply = adapter(client, "gemini-2.5-pro", "g0")
        .generate(&judging())
        .await
        .expect("second response");

    assert_eq!(reply, "4");
    server.await.expect("both connections served");
}
