use crate::db::models::{ChatMessage, Note, Sender};
use crate::dispatcher::history_from_chat;
use crate::llm::ChatTurn;
use chrono::{DateTime, Utc};

/// Notes summarised into the dashboard chat context.
const CONTEXT_NOTES: usize = 10;
const CONTEXT_EXCERPT_CHARS: usize = 200;
/// Prior messages sent along with a dashboard question.
pub const DASHBOARD_HISTORY: usize = 5;

/// An append-only conversation log.
#[derive(Debug, Clone)]
pub struct ChatSession {
    started_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> ChatMessage {
        self.push(Sender::User, content.into())
    }

    pub fn push_ai(&mut self, content: impl Into<String>) -> ChatMessage {
        self.push(Sender::Ai, content.into())
    }

    fn push(&mut self, sender: Sender, content: String) -> ChatMessage {
        let message = ChatMessage::new(sender, content);
        self.messages.push(message.clone());
        message
    }

    /// The last `limit` messages as completion turns.
    pub fn history(&self, limit: usize) -> Vec<ChatTurn> {
        let start = self.messages.len().saturating_sub(limit);
        history_from_chat(&self.messages[start..])
    }

    /// Log a dashboard question and return the history sent along with it:
    /// the messages that preceded the question.
    pub fn open_dashboard_turn(&mut self, question: &str) -> Vec<ChatTurn> {
        let history = self.history(DASHBOARD_HISTORY);
        self.push_user(question);
        history
    }

    /// Log a question about a single note. The whole prior conversation is
    /// returned as history.
    pub fn open_note_turn(&mut self, question: &str) -> Vec<ChatTurn> {
        let history = history_from_chat(&self.messages);
        self.push_user(question);
        history
    }
}

/// Context string describing the user's most recent notes.
pub fn dashboard_context(notes: &[Note]) -> String {
    let recent = notes
        .iter()
        .take(CONTEXT_NOTES)
        .map(|n| {
            let excerpt: String = n.content.chars().take(CONTEXT_EXCERPT_CHARS).collect();
            format!(
                "Title: {}\nContent: {}...\nCategory: {}",
                n.title, excerpt, n.category
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "User has {} notes. Recent notes context:\n\n{}",
        notes.len(),
        recent
    )
}
