//! Conversation state store — the single source of truth for one chat
//! session.
//!
//! Owned and mutated exclusively by the orchestrator; the presentation
//! layer only reads snapshots.

use uuid::Uuid;

use super::message::Message;
use super::state::{Phase, ScriptProgress};

/// Separator between messages in an exported transcript.
const TRANSCRIPT_SEPARATOR: &str = "\n\n---\n\n";

/// Ordered message log plus phase and scripted-question progress.
#[derive(Debug)]
pub struct ConversationStore {
    messages: Vec<Message>,
    phase: Phase,
    progress: ScriptProgress,
}

impl ConversationStore {
    /// Create a store seeded with the initial greeting.
    pub fn new(greeting: &str) -> Self {
        Self {
            messages: vec![Message::sara(greeting)],
            phase: Phase::default(),
            progress: ScriptProgress::default(),
        }
    }

    /// Reset to the initial state: greeting only, Gathering phase, no
    /// recorded answers.
    pub fn reset(&mut self, greeting: &str) {
        self.messages.clear();
        self.messages.push(Message::sara(greeting));
        self.phase = Phase::default();
        self.progress.reset();
    }

    /// Append a message, returning its id.
    pub fn push(&mut self, message: Message) -> Uuid {
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Swap the message with `id` for `replacement`, keeping its position.
    /// Returns false if no such message exists (e.g. after a reset).
    pub fn replace(&mut self, id: Uuid, replacement: Message) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(slot) => {
                *slot = replacement;
                true
            }
            None => false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Transition to the Freeform phase. Progress is frozen as-is so the
    /// summary prompt can still be synthesized from it.
    pub fn begin_freeform(&mut self) {
        self.phase = Phase::Freeform;
    }

    pub fn progress(&self) -> &ScriptProgress {
        &self.progress
    }

    /// Record the answer to the current scripted question.
    pub fn record_answer(&mut self, answer: &str) {
        self.progress.record_answer(answer);
    }

    /// Render the conversation as plain text, one `"<Sender>: <text>"` block
    /// per message. Pure over the current log — no side effects.
    pub fn export_transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.sender.label(), m.text))
            .collect::<Vec<_>>()
            .join(TRANSCRIPT_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_holds_only_the_greeting() {
        let store = ConversationStore::new("Hi, I'm Sara!");
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].text, "Hi, I'm Sara!");
        assert_eq!(store.phase(), Phase::Gathering);
        assert!(store.progress().answers.is_empty());
    }

    #[test]
    fn reset_restores_initial_state_regardless_of_prior_state() {
        let mut store = ConversationStore::new("greeting");
        store.push(Message::user("Doha"));
        store.record_answer("Doha");
        store.begin_freeform();
        store.push(Message::sara("Great choice!"));

        store.reset("greeting");

        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].text, "greeting");
        assert_eq!(store.phase(), Phase::Gathering);
        assert_eq!(store.progress().question_index, 0);
        assert!(store.progress().answers.is_empty());
    }

    #[test]
    fn replace_keeps_position() {
        let mut store = ConversationStore::new("greeting");
        let interim = store.push(Message::sara("crafting your plan..."));
        store.push(Message::user("thanks"));

        assert!(store.replace(interim, Message::sara("here is your itinerary")));

        assert_eq!(store.messages()[1].text, "here is your itinerary");
        assert_eq!(store.messages()[2].text, "thanks");
    }

    #[test]
    fn replace_missing_id_is_a_no_op() {
        let mut store = ConversationStore::new("greeting");
        assert!(!store.replace(Uuid::new_v4(), Message::sara("late reply")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn export_transcript_format() {
        let mut store = ConversationStore::new("Welcome!");
        store.push(Message::user("Hi Sara"));
        store.push(Message::sara("Where would you like to go?"));

        assert_eq!(
            store.export_transcript(),
            "Sara: Welcome!\n\n---\n\nUser: Hi Sara\n\n---\n\nSara: Where would you like to go?"
        );
    }

    #[test]
    fn export_transcript_is_pure() {
        let mut store = ConversationStore::new("Welcome!");
        store.push(Message::user("Hi"));
        assert_eq!(store.export_transcript(), store.export_transcript());
    }
}
