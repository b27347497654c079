use super::{AppError, AppState, CommandResult};
use crate::db::models::{Note, NoteKind};
use crate::doc_processor::{self, UploadedFile};
use crate::notes::NoteStats;
use std::path::{Path, PathBuf};

pub async fn list_notes(state: &AppState, query: &str, category: &str) -> Vec<Note> {
    let notes = state.notes.lock().await;
    notes.filter(query, category).into_iter().cloned().collect()
}

pub async fn get_note(state: &AppState, id: &str) -> CommandResult<Note> {
    let notes = state.notes.lock().await;
    notes
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NoteNotFound(id.to_string()))
}

pub async fn create_note(state: &AppState, title: &str, content: &str) -> CommandResult<Note> {
    let mut notes = state.notes.lock().await;
    let note = notes
        .create_note(title, content)
        .ok_or_else(|| AppError::Invalid("Note title is required".to_string()))?;
    state.auto_save(&notes)?;
    Ok(note)
}

pub async fn update_note(state: &AppState, note: Note) -> CommandResult<()> {
    let mut notes = state.notes.lock().await;
    let id = note.id.clone();
    if !notes.update(note) {
        return Err(AppError::NoteNotFound(id));
    }
    state.auto_save(&notes)
}

pub async fn delete_note(state: &AppState, id: &str) -> CommandResult<Note> {
    let removed = {
        let mut notes = state.notes.lock().await;
        let removed = notes
            .delete(id)
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;
        state.auto_save(&notes)?;
        removed
    };
    state.note_chats.lock().await.remove(id);
    Ok(removed)
}

pub async fn bulk_delete_notes(state: &AppState, ids: &[String]) -> CommandResult<usize> {
    let mut notes = state.notes.lock().await;
    let removed = notes.bulk_delete(ids);
    state.auto_save(&notes)?;
    Ok(removed)
}

/// Returns the new starred flag.
pub async fn toggle_star(state: &AppState, id: &str) -> CommandResult<bool> {
    let mut notes = state.notes.lock().await;
    let starred = notes
        .toggle_star(id)
        .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;
    state.auto_save(&notes)?;
    Ok(starred)
}

/// Returns false when the note was already in `category`.
pub async fn move_note(state: &AppState, id: &str, category: &str) -> CommandResult<bool> {
    let mut notes = state.notes.lock().await;
    if notes.get(id).is_none() {
        return Err(AppError::NoteNotFound(id.to_string()));
    }
    let moved = notes.move_to_category(id, category);
    if moved {
        state.auto_save(&notes)?;
    }
    Ok(moved)
}

pub async fn delete_category(state: &AppState, name: &str) -> CommandResult<usize> {
    let mut notes = state.notes.lock().await;
    let moved = notes.delete_category(name);
    state.auto_save(&notes)?;
    Ok(moved)
}

pub async fn record_audio(
    state: &AppState,
    duration: u64,
    audio_url: Option<String>,
) -> CommandResult<Note> {
    let mut notes = state.notes.lock().await;
    let note = notes.add_recording(duration, audio_url);
    state.auto_save(&notes)?;
    Ok(note)
}

/// Turn every file into a note and prepend them to the collection.
pub async fn upload_files(state: &AppState, files: Vec<UploadedFile>) -> CommandResult<Vec<Note>> {
    let created = doc_processor::process_batch(files).await;
    store_uploads(state, created).await
}

/// Read files from disk and upload them. Unreadable paths are skipped.
/// Audio notes keep their source path as the playable `audio_url`.
pub async fn upload_paths(state: &AppState, paths: &[PathBuf]) -> CommandResult<Vec<Note>> {
    let mut files = Vec::with_capacity(paths.len());
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match UploadedFile::from_path(path) {
            Ok(file) => {
                files.push(file);
                sources.push(path);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }

    let mut created = doc_processor::process_batch(files).await;
    for (note, source) in created.iter_mut().zip(sources) {
        if note.kind == NoteKind::Audio {
            note.audio_url = Some(source.to_string_lossy().into_owned());
        }
    }
    store_uploads(state, created).await
}

async fn store_uploads(state: &AppState, created: Vec<Note>) -> CommandResult<Vec<Note>> {
    let mut notes = state.notes.lock().await;
    notes.insert_batch(created.clone());
    state.auto_save(&notes)?;
    Ok(created)
}

pub async fn get_categories(state: &AppState) -> Vec<String> {
    state.notes.lock().await.categories()
}

pub async fn get_stats(state: &AppState) -> NoteStats {
    state.notes.lock().await.stats()
}

pub async fn get_tag_suggestions(state: &AppState) -> Vec<String> {
    state.notes.lock().await.tag_suggestions()
}

/// Ids of notes that look like duplicates of an earlier one.
pub async fn detect_duplicates(state: &AppState) -> Vec<String> {
    let notes = state.notes.lock().await;
    notes
        .potential_duplicates()
        .into_iter()
        .map(|n| n.id.clone())
        .collect()
}

pub async fn export_notes(state: &AppState, dir: &Path) -> CommandResult<PathBuf> {
    Ok(state.notes.lock().await.export_to_dir(dir)?)
}
