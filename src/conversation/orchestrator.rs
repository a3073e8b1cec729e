//! Conversation orchestrator — drives the two-phase chat protocol.
//!
//! Decides, per user turn, whether to emit the next scripted question,
//! synthesize the hand-off summary and call the gateway, or forward the
//! whole transcript. Owns all mutation of the [`ConversationStore`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::AssistantConfig;
use crate::llm::GatewayClient;

use super::message::Message;
use super::script::TripScript;
use super::state::Phase;
use super::store::ConversationStore;

/// Asynchronous delay primitive for scripted-question display pauses.
///
/// Injectable so tests can resolve delays immediately instead of waiting on
/// the wall clock.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production delay backed by the tokio timer.
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Coordinates the conversation: state store, script runner, and gateway.
///
/// Concurrency model: the busy flag is the sole guard. While an LLM request
/// or a scripted-question timer is pending, further submissions are no-ops.
/// A conversation reset bumps the epoch; pending work from an older epoch
/// discards its effect when it resolves instead of mutating the fresh
/// conversation.
pub struct Orchestrator {
    store: RwLock<ConversationStore>,
    gateway: Arc<dyn GatewayClient>,
    script: TripScript,
    delay: Arc<dyn Delay>,
    config: AssistantConfig,
    busy: AtomicBool,
    epoch: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        config: AssistantConfig,
        script: TripScript,
        gateway: Arc<dyn GatewayClient>,
        delay: Arc<dyn Delay>,
    ) -> Self {
        Self {
            store: RwLock::new(ConversationStore::new(&config.greeting)),
            gateway,
            script,
            delay,
            config,
            busy: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    // ── Public operations ───────────────────────────────────────────

    /// Open the conversation: the greeting is already seeded; emit the first
    /// scripted question after the display delay. One-time side effect on
    /// conversation start, before any user input.
    pub async fn open(&self) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.emit_scripted_question(epoch).await;
    }

    /// Submit one user turn.
    ///
    /// No-op when `text` trims to empty or when a turn is already in
    /// flight. Completes once the assistant's message (scripted question,
    /// reply, or fallback) has been appended.
    pub async fn submit_user_turn(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(epoch) = self.begin() else {
            tracing::debug!("submission ignored, a turn is already in flight");
            return;
        };

        let phase = {
            let mut store = self.store.write().await;
            store.push(Message::user(text));
            store.phase()
        };

        match phase {
            Phase::Gathering => self.gathering_turn(epoch, text).await,
            Phase::Freeform => self.freeform_turn(epoch).await,
        }
    }

    /// Reset to a fresh conversation and re-emit the first scripted
    /// question. Work still in flight keeps running to completion but its
    /// result is discarded against the new epoch.
    pub async fn start_new_conversation(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut store = self.store.write().await;
            store.reset(&self.config.greeting);
        }
        self.busy.store(false, Ordering::SeqCst);
        tracing::info!("conversation reset");
        self.emit_scripted_question(epoch).await;
    }

    /// Render the current conversation as plain text. Pure read, no I/O.
    pub async fn export_transcript(&self) -> String {
        self.store.read().await.export_transcript()
    }

    /// Snapshot of the message log for the presentation layer.
    pub async fn messages(&self) -> Vec<Message> {
        self.store.read().await.messages().to_vec()
    }

    pub async fn phase(&self) -> Phase {
        self.store.read().await.phase()
    }

    /// Whether a turn is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    // ── Turn handling ───────────────────────────────────────────────

    /// Gathering phase: record the answer, then either ask the next
    /// scripted question or hand off to the model.
    async fn gathering_turn(&self, epoch: u64, answer: &str) {
        let complete = {
            let mut store = self.store.write().await;
            store.record_answer(answer);
            self.script.is_complete(store.progress())
        };

        if !complete {
            self.emit_next_question(epoch).await;
            return;
        }

        // Final answer collected — synthesize the summary and hand off.
        let (interim_id, prompt) = {
            let mut store = self.store.write().await;
            store.begin_freeform();
            let prompt = self.script.summary_prompt(store.progress());
            let interim_id = store.push(Message::sara(self.config.crafting_message.as_str()));
            (interim_id, prompt)
        };

        // Prior scripted Q&A is not replayed: the synthesized summary is
        // the sole user turn in the hand-off transcript.
        let handoff = vec![Message::user(prompt)];
        let reply = self.gateway.generate_reply(&handoff).await;

        if self.epoch_current(epoch) {
            let text = match reply {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "gateway call failed during hand-off");
                    self.config.fallback_message.clone()
                }
            };
            self.store.write().await.replace(interim_id, Message::sara(text));
        }
        self.finish(epoch);
    }

    /// Freeform phase: forward the full transcript and append the reply.
    async fn freeform_turn(&self, epoch: u64) {
        let transcript = self.store.read().await.messages().to_vec();
        let reply = self.gateway.generate_reply(&transcript).await;

        if self.epoch_current(epoch) {
            let text = match reply {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "gateway call failed");
                    self.config.fallback_message.clone()
                }
            };
            self.store.write().await.push(Message::sara(text));
        }
        self.finish(epoch);
    }

    /// Emit the next scripted question after the display delay. Acquires
    /// the busy guard itself (open/reset path).
    async fn emit_scripted_question(&self, epoch: u64) {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.emit_next_question(epoch).await;
    }

    /// Emit the next scripted question. The busy guard must already be
    /// held; it is released on completion.
    async fn emit_next_question(&self, epoch: u64) {
        let question = {
            let store = self.store.read().await;
            self.script.next_question(store.progress()).map(str::to_owned)
        };

        self.delay.sleep(self.config.question_delay).await;

        if let Some(question) = question {
            if self.epoch_current(epoch) {
                self.store.write().await.push(Message::sara(question));
            }
        }
        self.finish(epoch);
    }

    // ── Busy flag and epoch guard ───────────────────────────────────

    /// Claim the busy guard. Returns the current epoch, or `None` when a
    /// turn is already in flight.
    fn begin(&self) -> Option<u64> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(self.epoch.load(Ordering::SeqCst))
    }

    fn epoch_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// Release the busy guard, unless the conversation was reset under us —
    /// the reset already cleared it for the new epoch.
    fn finish(&self, epoch: u64) {
        if self.epoch_current(epoch) {
            self.busy.store(false, Ordering::SeqCst);
        }
    }
}
