//! Conversation phase and scripted-question progress.

use serde::{Deserialize, Serialize};

/// The two phases of a conversation.
///
/// Starts at `Gathering` (scripted Q&A), transitions exactly once to
/// `Freeform` (open LLM-backed chat), and never goes back except through a
/// full conversation reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Gathering,
    Freeform,
}

impl Phase {
    pub fn is_freeform(&self) -> bool {
        matches!(self, Self::Freeform)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Gathering
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gathering => "gathering",
            Self::Freeform => "freeform",
        };
        write!(f, "{s}")
    }
}

/// Progress through the scripted question list.
///
/// `answers[i]` is the user's reply to question `i`. The index and the
/// answer list advance together, so `answers.len() == question_index` holds
/// whenever the conversation is still gathering. Frozen once the phase
/// transitions to `Freeform`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptProgress {
    pub question_index: usize,
    pub answers: Vec<String>,
}

impl ScriptProgress {
    /// Record the answer to the current question and advance the index.
    pub fn record_answer(&mut self, answer: impl Into<String>) {
        self.answers.push(answer.into());
        self.question_index += 1;
    }

    pub fn reset(&mut self) {
        self.question_index = 0;
        self.answers.clear();
    }
}
