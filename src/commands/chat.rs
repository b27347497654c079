use super::{AppError, AppState, CommandResult};
use crate::assistant;
use crate::chat::dashboard_context;
use crate::db::models::{ChatMessage, Insight, Note, NoteKind, Sender, Suggestion, VideoSummary};
use crate::youtube::extract_video_id;

pub const VIDEO_SUMMARY_CATEGORY: &str = "YouTube Summaries";

#[derive(Debug, serde::Serialize, Clone)]
pub struct ChatReply {
    pub message: ChatMessage,
    /// Set when every remote model failed and the fallback answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn get_chat_messages(state: &AppState) -> Vec<ChatMessage> {
    state.chat.lock().await.messages().to_vec()
}

/// Dashboard chat: the question is answered with the note collection as
/// context. The log is only locked to record each side of the exchange.
pub async fn send_chat_message(state: &AppState, content: &str) -> CommandResult<ChatReply> {
    if content.trim().is_empty() {
        return Err(AppError::Invalid("Message is empty".to_string()));
    }
    let context = dashboard_context(state.notes.lock().await.notes());
    let dispatcher = state.dispatcher().await;

    let history = state.chat.lock().await.open_dashboard_turn(content);
    let reply = dispatcher.respond(content, &context, false, &history).await;
    if let Some(error) = &reply.error {
        tracing::warn!(%error, "chat answered from fallback");
    }
    let message = state.chat.lock().await.push_ai(reply.content);
    Ok(ChatReply {
        message,
        error: reply.error,
    })
}

/// Note viewer chat. `draft` replaces the stored content while editing.
pub async fn ask_about_note(
    state: &AppState,
    note_id: &str,
    question: &str,
    draft: Option<&str>,
) -> CommandResult<ChatReply> {
    let note = state
        .notes
        .lock()
        .await
        .get(note_id)
        .cloned()
        .ok_or_else(|| AppError::NoteNotFound(note_id.to_string()))?;
    let dispatcher = state.dispatcher().await;

    let editing = draft.is_some();
    let context = draft.unwrap_or(&note.content);
    let history = state
        .note_chats
        .lock()
        .await
        .entry(note.id.clone())
        .or_default()
        .open_note_turn(question);
    let reply = dispatcher.respond(question, context, editing, &history).await;

    // The note may have been deleted while the answer was pending.
    let message = match state.note_chats.lock().await.get_mut(&note.id) {
        Some(session) => session.push_ai(reply.content),
        None => ChatMessage::new(Sender::Ai, reply.content),
    };
    Ok(ChatReply {
        message,
        error: reply.error,
    })
}

pub async fn get_note_chat(state: &AppState, note_id: &str) -> Vec<ChatMessage> {
    state
        .note_chats
        .lock()
        .await
        .get(note_id)
        .map(|s| s.messages().to_vec())
        .unwrap_or_default()
}

pub async fn summarize_youtube(state: &AppState, url: &str) -> CommandResult<VideoSummary> {
    let video_id =
        extract_video_id(url).ok_or_else(|| AppError::InvalidVideoUrl(url.to_string()))?;
    let dispatcher = state.dispatcher().await;
    Ok(assistant::summarize_video(&dispatcher, url, &video_id).await)
}

/// Store a video summary as a note.
pub async fn save_video_summary(state: &AppState, summary: &VideoSummary) -> CommandResult<Note> {
    let mut note = Note::new(summary.title.clone(), summary.note_content.clone(), NoteKind::Video);
    note.category = VIDEO_SUMMARY_CATEGORY.to_string();
    note.tags = vec!["youtube".to_string(), "summary".to_string()];

    let mut notes = state.notes.lock().await;
    notes.insert_batch(vec![note.clone()]);
    state.auto_save(&notes)?;
    Ok(note)
}

pub async fn search_notes(state: &AppState, query: &str) -> Vec<Note> {
    let notes = state.notes.lock().await.notes().to_vec();
    let dispatcher = state.dispatcher().await;
    assistant::enhance_search(&dispatcher, query, &notes).await
}

pub async fn generate_insights(state: &AppState) -> Vec<Insight> {
    let notes = state.notes.lock().await.notes().to_vec();
    let dispatcher = state.dispatcher().await;
    assistant::generate_insights(&dispatcher, &notes).await
}

pub async fn generate_suggestions(state: &AppState) -> Vec<Suggestion> {
    let notes = state.notes.lock().await.notes().to_vec();
    let dispatcher = state.dispatcher().await;
    assistant::generate_suggestions(&dispatcher, &notes).await
}

pub async fn suggest_tags(state: &AppState, content: &str) -> Vec<String> {
    let dispatcher = state.dispatcher().await;
    assistant::suggest_tags(&dispatcher, content).await
}
