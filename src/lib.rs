pub mod assistant;
pub mod auth;
pub mod chat;
pub mod commands;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod doc_processor;
pub mod llm;
pub mod notes;
pub mod youtube;

use commands::{AppState, CommandResult};
use config::AiConfig;
use db::Database;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("smarta_notes_lib=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Open the store under `app_dir` and build the application state from the
/// environment plus persisted settings.
pub fn setup(app_dir: &Path) -> CommandResult<AppState> {
    let database = Database::new(app_dir)?;
    AppState::new(database, AiConfig::from_env())
}
