//! `POST /api/sara` — forwards a chat history to the text-generation
//! provider and returns the reply.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::config::ProxyConfig;
use crate::conversation::Sender;
use crate::llm::gateway::{ChatHistoryRequest, ErrorResponse, ReplyResponse};

/// Shared state for the proxy handlers.
pub struct ProxyState {
    config: ProxyConfig,
    http: reqwest::Client,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// Build the proxy router. CORS is permissive — the original deployment
/// fronts a browser client.
pub fn proxy_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/api/sara", post(generate_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Provider wire format ────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ProviderPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct ProviderContent {
    role: &'static str,
    parts: Vec<ProviderPart>,
}

#[derive(Debug, Serialize)]
struct ProviderInstruction {
    parts: Vec<ProviderPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderRequest {
    contents: Vec<ProviderContent>,
    system_instruction: ProviderInstruction,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    candidates: Vec<ProviderCandidate>,
}

#[derive(Debug, Deserialize)]
struct ProviderCandidate {
    content: Option<ProviderReplyContent>,
}

#[derive(Debug, Deserialize)]
struct ProviderReplyContent {
    #[serde(default)]
    parts: Vec<ProviderReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ProviderReplyPart {
    text: Option<String>,
}

// ── Handler ─────────────────────────────────────────────────────────

async fn generate_handler(
    State(state): State<Arc<ProxyState>>,
    Json(request): Json<ChatHistoryRequest>,
) -> Response {
    let Some(api_key) = state.config.api_key.as_ref() else {
        error!("provider API key is not configured");
        return proxy_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "API key is not configured on the server.",
        );
    };

    // The provider requires the exchange to open with a user turn.
    let contents: Vec<ProviderContent> = request
        .chat_history
        .iter()
        .skip_while(|m| m.sender == Sender::Sara)
        .map(|m| ProviderContent {
            role: match m.sender {
                Sender::User => "user",
                Sender::Sara => "model",
            },
            parts: vec![ProviderPart {
                text: m.text.clone(),
            }],
        })
        .collect();

    if contents.is_empty() {
        return proxy_error(
            StatusCode::BAD_REQUEST,
            "chatHistory must contain at least one user message.",
        );
    }

    let url = format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        state.config.upstream_url.trim_end_matches('/'),
        state.config.model,
        api_key.expose_secret(),
    );

    let body = ProviderRequest {
        contents,
        system_instruction: ProviderInstruction {
            parts: vec![ProviderPart {
                text: state.config.system_instruction.clone(),
            }],
        },
    };

    // The URL carries the credential — never log it.
    let upstream = match state.http.post(&url).json(&body).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "upstream request failed");
            return proxy_error(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred.");
        }
    };

    let status = upstream.status();
    if !status.is_success() {
        warn!(%status, "provider returned an error");
        return proxy_error(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred.");
    }

    let parsed: ProviderResponse = match upstream.json().await {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "failed to decode provider response");
            return proxy_error(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred.");
        }
    };

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text);

    match text {
        Some(response_text) => {
            (StatusCode::OK, Json(ReplyResponse { response_text })).into_response()
        }
        None => {
            warn!("provider response contained no text");
            proxy_error(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred.")
        }
    }
}

fn proxy_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
