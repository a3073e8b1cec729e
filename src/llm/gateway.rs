//! Gateway client — ships a conversation transcript to the proxy and
//! returns the assistant's reply text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, Sender};
use crate::error::GatewayError;

// ── Proxy wire contract ─────────────────────────────────────────────

/// One transcript turn as the proxy sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub text: String,
    pub sender: Sender,
}

/// Request body for `POST /api/sara`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryRequest {
    pub chat_history: Vec<WireMessage>,
}

/// Success body (status 200).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    pub response_text: String,
}

/// Failure body (status ≥ 400).
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ── Client ──────────────────────────────────────────────────────────

/// Sends a conversation transcript to the text-generation service and
/// returns the reply. Failures surface as [`GatewayError`]; the caller
/// decides the user-visible fallback. Never retries.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn generate_reply(&self, transcript: &[Message]) -> Result<String, GatewayError>;
}

/// Drop leading assistant turns — the provider requires the exchange to
/// open with a user message. Fails if nothing is left.
pub(crate) fn to_wire_history(transcript: &[Message]) -> Result<Vec<WireMessage>, GatewayError> {
    let history: Vec<WireMessage> = transcript
        .iter()
        .skip_while(|m| m.sender == Sender::Sara)
        .map(|m| WireMessage {
            text: m.text.clone(),
            sender: m.sender,
        })
        .collect();

    if history.is_empty() {
        return Err(GatewayError::InvalidConversationState);
    }
    Ok(history)
}

/// HTTP client for the trusted proxy.
///
/// Only knows the proxy URL — the provider credential lives server-side and
/// never reaches this process's callers.
pub struct HttpGatewayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpGatewayClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn generate_reply(&self, transcript: &[Message]) -> Result<String, GatewayError> {
        let chat_history = to_wire_history(transcript)?;

        let response = self
            .http
            .post(&self.endpoint)
            .json(&ChatHistoryRequest { chat_history })
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| "no error detail".to_string());
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: ReplyResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(body.response_text)
    }
}
