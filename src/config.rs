//! Configuration types.
//!
//! Deployment-level settings only: the persona instruction, the greeting and
//! fixed assistant lines, scripted delays, provider model and credential.
//! All of it is opaque to the conversation core.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Persona/system instruction supplied to the provider out-of-band.
///
/// This is configuration, not business logic — the orchestrator never
/// interprets it.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
You are Sara, a friendly and expert AI travel planner.
Your goal is to help users plan their dream vacations.
Your responses should be helpful, engaging, and formatted for easy readability.
- For itineraries, use markdown lists.
- For budget estimates, use tables.
- Always be encouraging and excited about their travel plans.
- Do not mention you are an AI or language model. You are Sara.
";

/// Greeting that seeds every new conversation.
pub const DEFAULT_GREETING: &str = "Hello! I'm Sara, your personal AI travel planner. \
I'd love to help you plan your next adventure — let me ask you a few quick questions first.";

/// Interim message shown while the hand-off request is in flight.
pub const DEFAULT_CRAFTING_MESSAGE: &str = "Wonderful, that's everything I need! \
Give me a moment while I craft your personalized travel plan...";

/// Fixed fallback shown in place of any gateway failure.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "I seem to be having some trouble right now. Please try again in a moment.";

const DEFAULT_QUESTION_DELAY_MS: u64 = 600;
const DEFAULT_PROXY_PORT: u16 = 8787;
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_UPSTREAM_URL: &str = "https://generativelanguage.googleapis.com";

/// Settings for the conversation orchestrator.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Assistant message every conversation starts with.
    pub greeting: String,
    /// Interim "crafting your plan" message, replaced by the first reply.
    pub crafting_message: String,
    /// Fallback assistant message for any gateway failure.
    pub fallback_message: String,
    /// Display pause before each scripted question appears.
    pub question_delay: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            crafting_message: DEFAULT_CRAFTING_MESSAGE.to_string(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            question_delay: Duration::from_millis(DEFAULT_QUESTION_DELAY_MS),
        }
    }
}

impl AssistantConfig {
    /// Build from the environment, falling back to defaults.
    ///
    /// `SARA_QUESTION_DELAY_MS` overrides the scripted display delay.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("SARA_QUESTION_DELAY_MS") {
            let millis: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SARA_QUESTION_DELAY_MS".to_string(),
                message: format!("expected milliseconds, got {raw:?}"),
            })?;
            config.question_delay = Duration::from_millis(millis);
        }
        Ok(config)
    }
}

/// Settings for the trusted provider proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Port the proxy listens on.
    pub port: u16,
    /// Provider model identifier.
    pub model: String,
    /// Provider credential. `None` is allowed at startup — the proxy then
    /// answers every request with 500 instead of forwarding upstream.
    pub api_key: Option<SecretString>,
    /// Provider base URL (overridable so tests can stub the upstream).
    pub upstream_url: String,
    /// Persona instruction attached to every provider request.
    pub system_instruction: String,
}

impl ProxyConfig {
    /// Build from the environment.
    ///
    /// `SARA_API_KEY`, `SARA_MODEL`, `SARA_PROXY_PORT`, `SARA_UPSTREAM_URL`,
    /// `SARA_SYSTEM_INSTRUCTION` — all optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("SARA_PROXY_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SARA_PROXY_PORT".to_string(),
                message: format!("expected a port number, got {raw:?}"),
            })?,
            Err(_) => DEFAULT_PROXY_PORT,
        };

        Ok(Self {
            port,
            model: std::env::var("SARA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_key: std::env::var("SARA_API_KEY").ok().map(SecretString::from),
            upstream_url: std::env::var("SARA_UPSTREAM_URL")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string()),
            system_instruction: std::env::var("SARA_SYSTEM_INSTRUCTION")
                .unwrap_or_else(|_| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_assistant_config() {
        let config = AssistantConfig::default();
        assert_eq!(config.fallback_message, DEFAULT_FALLBACK_MESSAGE);
        assert_eq!(config.question_delay, Duration::from_millis(600));
        assert!(config.greeting.contains("Sara"));
    }
}
