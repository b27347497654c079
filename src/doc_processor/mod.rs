pub mod category;
pub mod extract;
pub mod synth;
pub mod thumbnail;

pub use category::FileCategory;
pub use extract::{ExtractError, Extraction};

use crate::db::models::Note;
use futures::future::join_all;
use serde::Serialize;
use std::path::Path;

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the MIME type from its suffix.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        let mime = category::mime_for_extension(&category::extension_of(&name));
        Ok(Self::new(name, mime, bytes))
    }

    pub fn extension(&self) -> String {
        category::extension_of(&self.name)
    }

    pub fn category(&self) -> FileCategory {
        FileCategory::classify(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub original_name: String,
    pub size: u64,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Result of running a file through its category handler.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProcessedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub category: FileCategory,
    pub size: u64,
    pub content: String,
    pub metadata: FileMetadata,
}

/// Run the handler for the file's category.
pub fn extract(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    extract::extractor(file.category())(file)
}

/// Classify and extract a file. Handler failures become the content text.
pub fn process_file(file: &UploadedFile) -> ProcessedFile {
    let category = file.category();
    let extraction = match extract(file) {
        Ok(extraction) => extraction,
        Err(e) => {
            tracing::warn!(file = %file.name, %category, error = %e, "file extraction failed");
            Extraction {
                text: format!("Error processing file {}: {}", file.name, e),
                ..Extraction::default()
            }
        }
    };

    ProcessedFile {
        name: file.name.clone(),
        category,
        size: file.size,
        content: extraction.text,
        metadata: FileMetadata {
            original_name: file.name.clone(),
            size: file.size,
            mime_type: file.mime_type.clone(),
            duration: extraction.duration,
            thumbnail: extraction.thumbnail,
        },
    }
}

/// Process every file concurrently and return one note per file, in input
/// order. A task that dies yields an error note instead of failing the batch.
pub async fn process_batch(files: Vec<UploadedFile>) -> Vec<Note> {
    let count = files.len();
    let tasks = files.into_iter().map(|file| async move {
        let (name, size, mime_type) = (file.name.clone(), file.size, file.mime_type.clone());
        let joined = tokio::task::spawn_blocking(move || {
            synth::note_from_processed(&process_file(&file), synth::UPLOADS_CATEGORY)
        })
        .await;
        match joined {
            Ok(note) => note,
            Err(e) => {
                tracing::error!(file = %name, error = %e, "file processing task failed");
                synth::failed_upload_note(&name, size, &mime_type, &e.to_string())
            }
        }
    });

    let notes = join_all(tasks).await;
    tracing::info!(count, "processed file batch");
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NoteKind;

    #[test]
    fn test_uploaded_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Agenda.MD");
        std::fs::write(&path, "# Weekly meeting").unwrap();

        let file = UploadedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "Agenda.MD");
        assert_eq!(file.size, 16);
        assert_eq!(file.mime_type, "text/markdown");
        assert_eq!(file.extension(), "md");
        assert_eq!(file.category(), FileCategory::Text);
    }

    #[test]
    fn test_process_file_captures_handler_error() {
        let file = UploadedFile::new("bad.txt", "text/plain", vec![0xff, 0xfe]);
        let processed = process_file(&file);
        assert_eq!(processed.category, FileCategory::Text);
        assert!(processed.content.starts_with("Error processing file bad.txt: "));
        assert_eq!(processed.metadata.size, 2);
    }

    #[test]
    fn test_process_file_metadata() {
        let file = UploadedFile::new("talk.wav", "audio/wav", vec![0u8; 64_000]);
        let processed = process_file(&file);
        assert_eq!(processed.metadata.duration, Some(4));
        assert_eq!(processed.metadata.original_name, "talk.wav");
        assert_eq!(processed.metadata.mime_type, "audio/wav");
    }

    #[test]
    fn test_processed_file_serializes_category_as_type() {
        let processed = process_file(&UploadedFile::new("a.txt", "text/plain", b"hi".to_vec()));
        let json = serde_json::to_value(&processed).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["metadata"]["originalName"], "a.txt");
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_survives_bad_files() {
        let files = vec![
            UploadedFile::new("one.txt", "text/plain", b"first".to_vec()),
            UploadedFile::new("broken.txt", "text/plain", vec![0xc3, 0x28]),
            UploadedFile::new("photo.png", "image/png", b"not a png".to_vec()),
            UploadedFile::new("clip.mp4", "video/mp4", vec![0u8; 200_000]),
        ];
        let notes = process_batch(files).await;

        assert_eq!(notes.len(), 4);
        let titles: Vec<_> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["one.txt", "broken.txt", "photo.png", "clip.mp4"]);
        assert_eq!(notes[0].content, "first");
        assert!(notes[1].content.starts_with("Error processing file broken.txt"));
        assert_eq!(notes[2].kind, NoteKind::Image);
        assert_eq!(notes[2].file_url, None);
        assert_eq!(notes[3].duration, Some(2));
        assert!(notes.iter().all(|n| n.category == "Uploads"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        assert!(process_batch(Vec::new()).await.is_empty());
    }
}
