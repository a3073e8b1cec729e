//! Conversation core — messages, phase state, the scripted questionnaire,
//! and the orchestrator that drives the two-phase chat protocol.

pub mod message;
pub mod orchestrator;
pub mod script;
pub mod state;
pub mod store;

pub use message::{Message, Sender};
pub use orchestrator::{Delay, Orchestrator, TokioDelay};
pub use script::TripScript;
pub use state::{Phase, ScriptProgress};
pub use store::ConversationStore;
