use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use answergrid::gateway::{Backend, GatewayConfig, ProviderError, ProviderGateway};

fn config_for(server: &MockServer) -> GatewayConfig {
    GatewayConfig {
        timeout: Duration::from_secs(5),
        model: None,
        base_url: Some(server.uri()),
    }
}

#[tokio::test]
async fn chat_completions_parses_reply_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": { "content": "Revenue is 100M." },
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let gateway = ProviderGateway::configure(Backend::OpenAi, "sk-test", config_for(&server))
        .unwrap();

    let reply = gateway.answer("Evaluate Acme").await.unwrap();
    assert_eq!(reply, "Revenue is 100M.");
}

#[tokio::test]
async fn chat_completions_sends_configured_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(wiremock::matchers::body_partial_json(
            json!({ "model": "grok-2-latest" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .mount(&server)
        .await;

    let gateway =
        ProviderGateway::configure(Backend::Grok, "sk-test", config_for(&server)).unwrap();

    assert_eq!(gateway.answer("hi").await.unwrap(), "ok");
}

#[tokio::test]
async fn chat_completions_maps_error_body_with_code_and_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "bad key", "code": "invalid_api_key" }
        })))
        .mount(&server)
        .await;

    let gateway = ProviderGateway::configure(Backend::Perplexity, "sk-bad", config_for(&server))
        .unwrap();

    let err = gateway.answer("hi").await.unwrap_err();
    match &err {
        ProviderError::Provider {
            backend,
            message,
            retryable,
            context,
        } => {
            assert_eq!(*backend, "perplexity");
            assert_eq!(message, "bad key");
            assert!(!retryable);
            let ctx = context.as_ref().expect("expected error context");
            assert_eq!(ctx.http_status, Some(401));
            assert_eq!(ctx.provider_code.as_deref(), Some("invalid_api_key"));
        }
        other => panic!("expected Provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_completions_marks_server_errors_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let gateway =
        ProviderGateway::configure(Backend::OpenAi, "sk-test", config_for(&server)).unwrap();

    let err = gateway.answer("hi").await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.code(), "provider_error");
}

#[tokio::test]
async fn chat_completions_rejects_empty_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let gateway =
        ProviderGateway::configure(Backend::OpenAi, "sk-test", config_for(&server)).unwrap();

    let err = gateway.answer("hi").await.unwrap_err();
    assert!(err.to_string().contains("No choices"));
}

#[tokio::test]
async fn anthropic_parses_text_content_blocks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header_exists("anthropic-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "Revenue is 100M." }],
            "stop_reason": "end_turn"
        })))
        .mount(&server)
        .await;

    let gateway =
        ProviderGateway::configure(Backend::Anthropic, "sk-ant-test", config_for(&server))
            .unwrap();

    let reply = gateway.answer("Evaluate Acme").await.unwrap();
    assert_eq!(reply, "Revenue is 100M.");
}

#[tokio::test]
async fn anthropic_always_sends_max_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "ok" }]
        })))
        .mount(&server)
        .await;

    let gateway =
        ProviderGateway::configure(Backend::Anthropic, "sk-ant-test", config_for(&server))
            .unwrap();
    gateway.answer("hi").await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body["max_tokens"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn anthropic_maps_error_type_into_context() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "error",
            "error": { "type": "rate_limit_error", "message": "slow down" }
        })))
        .mount(&server)
        .await;

    let gateway =
        ProviderGateway::configure(Backend::Anthropic, "sk-ant-test", config_for(&server))
            .unwrap();

    let err = gateway.answer("hi").await.unwrap_err();
    match &err {
        ProviderError::Provider {
            message,
            retryable,
            context,
            ..
        } => {
            assert_eq!(message, "slow down");
            assert!(retryable);
            let ctx = context.as_ref().expect("expected error context");
            assert_eq!(ctx.http_status, Some(429));
            assert_eq!(ctx.provider_code.as_deref(), Some("rate_limit_error"));
        }
        other => panic!("expected Provider error, got {other:?}"),
    }
}
