//! Error types for Sara Assist.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures raised by the LLM gateway client.
///
/// `InvalidConversationState` is a precondition violation (there is no user
/// turn to send) and is detected before any network I/O. Everything else is
/// a transport or provider failure. The orchestrator catches all of these
/// and converts them into a single fixed fallback message; none of them is
/// ever shown verbatim to the end user.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Conversation has no user turn to send")]
    InvalidConversationState,

    #[error("Proxy request failed with status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Invalid response from proxy: {0}")]
    InvalidResponse(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
