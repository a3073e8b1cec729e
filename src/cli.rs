//! Terminal chat REPL — the local presentation layer.
//!
//! Reads user turns from stdin, renders Sara's replies, and maps slash
//! commands onto orchestrator operations. The orchestrator completes each
//! operation before the next line is read, so rendering is a simple diff of
//! the message log.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::conversation::{Orchestrator, Sender};
use crate::error::Error;

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    UserTurn(String),
    NewConversation,
    SaveTranscript(Option<PathBuf>),
    Quit,
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    match trimmed {
        "/new" => Command::NewConversation,
        "/quit" | "/exit" => Command::Quit,
        _ if trimmed == "/save" || trimmed.starts_with("/save ") => {
            let path = trimmed
                .strip_prefix("/save")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from);
            Command::SaveTranscript(path)
        }
        _ => Command::UserTurn(trimmed.to_string()),
    }
}

/// Write the current transcript to `path` (the transcript download of the
/// original UI).
pub async fn save_transcript(orchestrator: &Orchestrator, path: &Path) -> Result<(), Error> {
    let transcript = orchestrator.export_transcript().await;
    tokio::fs::write(path, transcript).await?;
    Ok(())
}

/// Interactive stdin/stdout chat loop.
pub struct ChatRepl {
    orchestrator: Arc<Orchestrator>,
    rendered: usize,
}

impl ChatRepl {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            rendered: 0,
        }
    }

    pub async fn run(mut self) -> Result<(), Error> {
        self.orchestrator.open().await;
        self.render_new_messages().await;

        let stdin = tokio::io::stdin();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();
        eprint!("> ");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                eprint!("> ");
                continue;
            }

            match parse_command(&line) {
                Command::Quit => break,
                Command::NewConversation => {
                    self.rendered = 0;
                    self.orchestrator.start_new_conversation().await;
                }
                Command::SaveTranscript(path) => {
                    let path = path.unwrap_or_else(|| PathBuf::from("sara-transcript.txt"));
                    save_transcript(&self.orchestrator, &path).await?;
                    eprintln!("💾 Transcript saved to {}", path.display());
                }
                Command::UserTurn(text) => {
                    eprintln!("⏳ Sara is typing...");
                    self.orchestrator.submit_user_turn(&text).await;
                }
            }

            self.render_new_messages().await;
            eprint!("> ");
        }

        Ok(())
    }

    /// Print messages appended since the last render. User turns are
    /// skipped — the terminal already echoes what was typed.
    async fn render_new_messages(&mut self) {
        let messages = self.orchestrator.messages().await;
        let start = self.rendered.min(messages.len());
        for message in &messages[start..] {
            if message.sender == Sender::Sara {
                println!("\nSara: {}\n", message.text);
            }
        }
        self.rendered = messages.len();
    }
}
