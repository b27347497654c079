use super::ProcessedFile;
use crate::db::models::{Note, NoteKind};

pub const UPLOADS_CATEGORY: &str = "Uploads";

const LARGE_FILE_BYTES: u64 = 10 * 1024 * 1024;
const SMALL_FILE_BYTES: u64 = 1024;
const SUMMARY_PASSTHROUGH_CHARS: usize = 200;
const SUMMARY_EXCERPT_CHARS: usize = 150;

const KEYWORD_TAGS: &[(&[&str], &str)] = &[
    (&["meeting", "agenda"], "meeting"),
    (&["project", "task"], "project"),
    (&["research", "study"], "research"),
    (&["report", "analysis"], "report"),
    (&["presentation", "slide"], "presentation"),
];

/// Size and keyword tags derived from a processed file.
pub fn smart_tags(file: &ProcessedFile) -> Vec<String> {
    let mut tags = Vec::new();
    if file.size > LARGE_FILE_BYTES {
        tags.push("large-file".to_string());
    }
    if file.size < SMALL_FILE_BYTES {
        tags.push("small-file".to_string());
    }

    let content = file.content.to_lowercase();
    for (keywords, tag) in KEYWORD_TAGS {
        if keywords.iter().any(|k| content.contains(k)) {
            tags.push(tag.to_string());
        }
    }
    tags
}

pub fn summarize(content: &str) -> String {
    if content.chars().count() <= SUMMARY_PASSTHROUGH_CHARS {
        return content.to_string();
    }
    let excerpt: String = content.chars().take(SUMMARY_EXCERPT_CHARS).collect();
    format!("{}...", excerpt.trim())
}

/// Build the note stored for an uploaded file.
pub fn note_from_processed(file: &ProcessedFile, category: &str) -> Note {
    let kind = file.category.note_kind();
    let mut note = Note::new(file.name.clone(), file.content.clone(), kind);

    note.tags = vec![file.category.to_string(), "uploaded".to_string()];
    note.tags.extend(smart_tags(file));
    note.category = category.to_string();
    note.summary = Some(summarize(&file.content));
    if matches!(kind, NoteKind::Audio | NoteKind::Video) {
        note.transcription = Some(file.content.clone());
    }
    note.file_url = file.metadata.thumbnail.clone();
    note.duration = file.metadata.duration;
    note
}

/// Note kind guessed from a MIME type's major part.
pub fn kind_from_mime(mime_type: &str) -> NoteKind {
    match mime_type.split('/').next().unwrap_or_default() {
        "audio" => NoteKind::Audio,
        "video" => NoteKind::Video,
        "image" => NoteKind::Image,
        _ => NoteKind::Document,
    }
}

/// Placeholder note for a file whose processing task died.
pub fn failed_upload_note(name: &str, size: u64, mime_type: &str, error: &str) -> Note {
    let content = format!(
        "File upload failed: {name}\nSize: {size} bytes\nType: {mime_type}\nError: {error}\nUploaded: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let mut note = Note::new(name, content, kind_from_mime(mime_type));
    note.tags = vec![
        "uploaded".to_string(),
        "error".to_string(),
        mime_type.split('/').next().unwrap_or_default().to_string(),
    ];
    note.category = UPLOADS_CATEGORY.to_string();
    note.summary = Some(format!("Failed to process: {name}"));
    note
}
