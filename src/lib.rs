//! Sara Assist — conversational AI travel planner.
//!
//! The conversation core (messages, state store, scripted questionnaire,
//! orchestrator), the LLM gateway client, and the trusted provider proxy
//! behind the `sara-assist` terminal chat binary.

pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod proxy;
