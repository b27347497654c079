//! Application-level operations over shared state, one per dashboard action.

pub mod chat;
pub mod notes;
pub mod settings;

use crate::chat::ChatSession;
use crate::config::AiConfig;
use crate::db::{Database, StoreError};
use crate::dispatcher::Dispatcher;
use crate::llm::LlmError;
use crate::notes::NoteBook;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Unknown setting key: {0}")]
    UnknownSetting(String),
    #[error("Invalid YouTube URL: {0}")]
    InvalidVideoUrl(String),
    #[error("{0}")]
    Invalid(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type CommandResult<T> = Result<T, AppError>;

pub struct AppState {
    pub db: Database,
    pub notes: Mutex<NoteBook>,
    pub chat: Mutex<ChatSession>,
    /// Per-note viewer conversations, keyed by note id.
    pub note_chats: Mutex<HashMap<String, ChatSession>>,
    dispatcher: RwLock<Arc<Dispatcher>>,
    base_config: AiConfig,
}

impl AppState {
    /// Load the saved collection and build a dispatcher from `config` plus
    /// any persisted settings.
    pub fn new(db: Database, config: AiConfig) -> CommandResult<Self> {
        let notes = NoteBook::load(&db)?;
        let dispatcher = Dispatcher::new(&config.clone().apply_settings(&db)?)?;
        tracing::info!(notes = notes.len(), remote = dispatcher.is_remote(), "app state ready");
        Ok(Self {
            db,
            notes: Mutex::new(notes),
            chat: Mutex::new(ChatSession::new()),
            note_chats: Mutex::new(HashMap::new()),
            dispatcher: RwLock::new(Arc::new(dispatcher)),
            base_config: config,
        })
    }

    pub async fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.read().await.clone()
    }

    /// Rebuild the dispatcher after AI settings change.
    pub async fn reload_dispatcher(&self) -> CommandResult<()> {
        let config = self.base_config.clone().apply_settings(&self.db)?;
        let dispatcher = Dispatcher::new(&config)?;
        *self.dispatcher.write().await = Arc::new(dispatcher);
        Ok(())
    }

    /// Persist the collection under the notes storage key.
    pub(crate) fn auto_save(&self, notes: &NoteBook) -> CommandResult<()> {
        notes.save(&self.db)?;
        tracing::debug!(count = notes.len(), "auto-saved notes");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let config = AiConfig {
        test_mode: true,
        ..AiConfig::default()
    };
    AppState::new(Database::open_in_memory().unwrap(), config).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_serializes_as_message() {
        let json = serde_json::to_string(&AppError::NoteNotFound("n1".into())).unwrap();
        assert_eq!(json, "\"Note not found: n1\"");
    }

    #[tokio::test]
    async fn test_state_loads_saved_notes() {
        let db = Database::open_in_memory().unwrap();
        let mut book = NoteBook::new();
        book.create_note("kept", "");
        book.save(&db).unwrap();

        let state = AppState::new(db, AiConfig::default()).unwrap();
        assert_eq!(state.notes.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reload_picks_up_stored_key() {
        let state = AppState::new(Database::open_in_memory().unwrap(), AiConfig::default()).unwrap();
        assert!(!state.dispatcher().await.is_remote());

        state.db.set_setting("openrouter_api_key", "sk-or-test-key").unwrap();
        state.reload_dispatcher().await.unwrap();
        assert!(state.dispatcher().await.is_remote());
    }
}
