//! Integration tests for the proxy + gateway HTTP stack.
//!
//! Each test spins the proxy on a random port, usually backed by a stub
//! upstream provider server, and exercises the real HTTP contract end to
//! end through `HttpGatewayClient`.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::timeout;

use sara_assist::config::ProxyConfig;
use sara_assist::conversation::Message;
use sara_assist::error::GatewayError;
use sara_assist::llm::{GatewayClient, HttpGatewayClient};
use sara_assist::proxy::{ProxyState, proxy_router};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve `app` on a random port and return the port.
async fn serve(app: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;
    port
}

/// Stub upstream that replies with a fixed text and records the request
/// body it received.
async fn start_stub_upstream(reply: &'static str) -> (u16, Arc<Mutex<Option<Value>>>) {
    let captured = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    let app = Router::new().route(
        "/v1beta/models/{model}",
        post(move |Json(body): Json<Value>| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().await = Some(body);
                Json(json!({
                    "candidates": [
                        { "content": { "parts": [ { "text": reply } ] } }
                    ]
                }))
            }
        }),
    );
    (serve(app).await, captured)
}

fn proxy_config(upstream_port: u16, api_key: Option<&str>) -> ProxyConfig {
    ProxyConfig {
        port: 0,
        model: "gemini-2.5-flash".to_string(),
        api_key: api_key.map(SecretString::from),
        upstream_url: format!("http://127.0.0.1:{upstream_port}"),
        system_instruction: "You are Sara.".to_string(),
    }
}

async fn start_proxy(config: ProxyConfig) -> u16 {
    serve(proxy_router(Arc::new(ProxyState::new(config)))).await
}

fn gateway_for(proxy_port: u16) -> HttpGatewayClient {
    HttpGatewayClient::new(format!("http://127.0.0.1:{proxy_port}/api/sara"))
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_round_trip_returns_reply_verbatim() {
    timeout(TEST_TIMEOUT, async {
        let (upstream_port, _) = start_stub_upstream("Doha is lovely in June!").await;
        let proxy_port = start_proxy(proxy_config(upstream_port, Some("test-key"))).await;
        let gateway = gateway_for(proxy_port);

        let reply = gateway
            .generate_reply(&[Message::user("Where to: Doha\nWhen: June")])
            .await
            .unwrap();

        assert_eq!(reply, "Doha is lovely in June!");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn proxy_maps_roles_and_attaches_system_instruction() {
    timeout(TEST_TIMEOUT, async {
        let (upstream_port, captured) = start_stub_upstream("ok").await;
        let proxy_port = start_proxy(proxy_config(upstream_port, Some("test-key"))).await;
        let gateway = gateway_for(proxy_port);

        let transcript = vec![
            Message::sara("greeting"),
            Message::user("I want a beach trip"),
            Message::sara("Anywhere in mind?"),
            Message::user("Doha"),
        ];
        gateway.generate_reply(&transcript).await.unwrap();

        let body = captured.lock().await.clone().expect("upstream saw a request");
        let contents = body["contents"].as_array().unwrap();
        // Leading assistant turn dropped; roles mapped user/model.
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "I want a beach trip");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are Sara."
        );
    })
    .await
    .expect("test timed out");
}

// ── Failure paths ───────────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_returns_500_without_forwarding() {
    timeout(TEST_TIMEOUT, async {
        let (upstream_port, captured) = start_stub_upstream("never sent").await;
        let proxy_port = start_proxy(proxy_config(upstream_port, None)).await;
        let gateway = gateway_for(proxy_port);

        let err = gateway
            .generate_reply(&[Message::user("hello")])
            .await
            .unwrap_err();

        match err {
            GatewayError::UpstreamStatus { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("API key"), "got: {message}");
            }
            other => panic!("expected UpstreamStatus, got {other:?}"),
        }
        assert!(
            captured.lock().await.is_none(),
            "unauthenticated request must never reach the provider"
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn assistant_only_history_returns_400() {
    timeout(TEST_TIMEOUT, async {
        let (upstream_port, _) = start_stub_upstream("unused").await;
        let proxy_port = start_proxy(proxy_config(upstream_port, Some("test-key"))).await;

        // Bypass the client (which trims this itself) and hit the proxy raw.
        let response = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{proxy_port}/api/sara"))
            .json(&json!({ "chatHistory": [ { "text": "hi", "sender": "sara" } ] }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST.as_u16());
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("user message"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn upstream_failure_maps_to_500() {
    timeout(TEST_TIMEOUT, async {
        let app = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
        );
        let upstream_port = serve(app).await;
        let proxy_port = start_proxy(proxy_config(upstream_port, Some("test-key"))).await;
        let gateway = gateway_for(proxy_port);

        let err = gateway
            .generate_reply(&[Message::user("hello")])
            .await
            .unwrap_err();

        match err {
            GatewayError::UpstreamStatus { status, message } => {
                assert_eq!(status, 500);
                // Provider detail is never forwarded to the caller.
                assert_eq!(message, "An internal error occurred.");
            }
            other => panic!("expected UpstreamStatus, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_upstream_payload_maps_to_500() {
    timeout(TEST_TIMEOUT, async {
        let app = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async { Json(json!({})) }),
        );
        let upstream_port = serve(app).await;
        let proxy_port = start_proxy(proxy_config(upstream_port, Some("test-key"))).await;
        let gateway = gateway_for(proxy_port);

        let err = gateway
            .generate_reply(&[Message::user("hello")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::UpstreamStatus { status: 500, .. }
        ));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_transcript_fails_before_any_network_call() {
    timeout(TEST_TIMEOUT, async {
        // Deliberately unreachable endpoint: the precondition check must
        // fire first.
        let gateway = HttpGatewayClient::new("http://127.0.0.1:1/api/sara");

        let err = gateway.generate_reply(&[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConversationState));

        let err = gateway
            .generate_reply(&[Message::sara("greeting")])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConversationState));
    })
    .await
    .expect("test timed out");
}
