//! LLM gateway integration.
//!
//! The conversation core never talks to the model provider directly: it
//! ships transcripts to the trusted proxy (`crate::proxy`), which holds the
//! provider credential. [`GatewayClient`] is the seam the orchestrator is
//! written against; [`HttpGatewayClient`] is the production implementation.

pub mod gateway;

pub use gateway::{GatewayClient, HttpGatewayClient};

use std::sync::Arc;

/// Build the production gateway client for a proxy endpoint.
pub fn create_gateway(endpoint: impl Into<String>) -> Arc<dyn GatewayClient> {
    Arc::new(HttpGatewayClient::new(endpoint))
}
