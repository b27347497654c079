use crate::db::models::NoteKind;
use serde::{Deserialize, Serialize};

/// Coarse classification of an uploaded file.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Text,
    Document,
    Spreadsheet,
    Presentation,
    Image,
    Audio,
    Video,
    Code,
    Archive,
    Unknown,
}

/// Recognised suffixes (lower-case, no dot) per category.
pub const SUPPORTED_TYPES: &[(FileCategory, &[&str])] = &[
    (FileCategory::Text, &["txt", "md", "rtf"]),
    (FileCategory::Document, &["pdf", "doc", "docx", "odt"]),
    (FileCategory::Spreadsheet, &["xls", "xlsx", "csv", "ods"]),
    (FileCategory::Presentation, &["ppt", "pptx", "odp"]),
    (
        FileCategory::Image,
        &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"],
    ),
    (FileCategory::Audio, &["mp3", "wav", "ogg", "m4a", "flac", "aac"]),
    (
        FileCategory::Video,
        &["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv"],
    ),
    (
        FileCategory::Code,
        &[
            "js", "ts", "jsx", "tsx", "py", "java", "cpp", "c", "html", "css", "json", "xml",
            "yaml", "yml",
        ],
    ),
    (FileCategory::Archive, &["zip", "rar", "7z", "tar", "gz"]),
];

const LANGUAGES: &[(&str, &str)] = &[
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("jsx", "React JSX"),
    ("tsx", "React TSX"),
    ("py", "Python"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("c", "C"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("json", "JSON"),
    ("xml", "XML"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
];

/// Lower-cased text after the last '.', or empty when there is none.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

pub fn language_for_extension(ext: &str) -> &'static str {
    LANGUAGES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
        .unwrap_or("Unknown")
}

/// Best-effort MIME type for files read from disk.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "txt" => "text/plain",
        "md" => "text/markdown",
        "rtf" => "application/rtf",
        "csv" => "text/csv",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "json" => "application/json",
        "html" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        _ => "application/octet-stream",
    }
}

impl FileCategory {
    pub const ALL: [FileCategory; 10] = [
        FileCategory::Text,
        FileCategory::Document,
        FileCategory::Spreadsheet,
        FileCategory::Presentation,
        FileCategory::Image,
        FileCategory::Audio,
        FileCategory::Video,
        FileCategory::Code,
        FileCategory::Archive,
        FileCategory::Unknown,
    ];

    pub fn from_extension(ext: &str) -> Self {
        SUPPORTED_TYPES
            .iter()
            .find(|(_, exts)| exts.contains(&ext))
            .map(|(category, _)| *category)
            .unwrap_or(FileCategory::Unknown)
    }

    pub fn classify(filename: &str) -> Self {
        Self::from_extension(&extension_of(filename))
    }

    /// Persisted note kind for this category.
    pub fn note_kind(self) -> NoteKind {
        match self {
            FileCategory::Text | FileCategory::Code => NoteKind::Text,
            FileCategory::Image => NoteKind::Image,
            FileCategory::Audio => NoteKind::Audio,
            FileCategory::Video => NoteKind::Video,
            FileCategory::Document
            | FileCategory::Spreadsheet
            | FileCategory::Presentation
            | FileCategory::Archive
            | FileCategory::Unknown => NoteKind::Document,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Text => "text",
            FileCategory::Document => "document",
            FileCategory::Spreadsheet => "spreadsheet",
            FileCategory::Presentation => "presentation",
            FileCategory::Image => "image",
            FileCategory::Audio => "audio",
            FileCategory::Video => "video",
            FileCategory::Code => "code",
            FileCategory::Archive => "archive",
            FileCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
