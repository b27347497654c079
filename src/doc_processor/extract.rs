use super::category::{extension_of, language_for_extension, FileCategory};
use super::thumbnail::{thumbnail_data_uri, VIDEO_THUMBNAIL};
use super::UploadedFile;

/// Rows kept in a CSV preview.
pub const CSV_PREVIEW_LINES: usize = 10;
pub const CSV_TRUNCATION_MARKER: &str = "... (truncated)";

const BYTES_PER_PDF_PAGE: u64 = 50_000;
const AUDIO_BYTES_PER_SECOND: u64 = 16_000;
const VIDEO_BYTES_PER_SECOND: u64 = 100_000;

/// Text pulled out of a file plus whatever metadata the handler derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub text: String,
    /// Seconds.
    pub duration: Option<u64>,
    /// Data URI.
    pub thumbnail: Option<String>,
}

impl Extraction {
    fn text(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("content is not valid UTF-8 text: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("thumbnail generation failed: {0}")]
    Thumbnail(#[from] image::ImageError),
}

pub type Extractor = fn(&UploadedFile) -> Result<Extraction, ExtractError>;

/// Handler for each category.
pub fn extractor(category: FileCategory) -> Extractor {
    match category {
        FileCategory::Text => extract_text,
        FileCategory::Document => extract_document,
        FileCategory::Spreadsheet => extract_spreadsheet,
        FileCategory::Presentation => extract_presentation,
        FileCategory::Image => extract_image,
        FileCategory::Audio => extract_audio,
        FileCategory::Video => extract_video,
        FileCategory::Code => extract_code,
        FileCategory::Archive => extract_archive,
        FileCategory::Unknown => extract_unknown,
    }
}

fn read_text(file: &UploadedFile) -> Result<&str, ExtractError> {
    Ok(std::str::from_utf8(&file.bytes)?)
}

fn extract_text(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    Ok(Extraction::text(read_text(file)?.to_string()))
}

fn extract_document(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    let text = match extension_of(&file.name).as_str() {
        "pdf" => format!(
            "[PDF Content Extracted from {name}]\n\nPDF text is not extracted yet; the file is stored with its details below.\n\nFile size: {size} bytes\nEstimated pages: {pages}",
            name = file.name,
            size = file.size,
            pages = file.size.div_ceil(BYTES_PER_PDF_PAGE)
        ),
        "doc" | "docx" => format!(
            "[Word Document Content from {name}]\n\nWord document text is not extracted yet; the file is stored with its details below.\n\nFile size: {size} bytes\nDocument type: {mime}",
            name = file.name,
            size = file.size,
            mime = file.mime_type
        ),
        _ => format!("Document content from {} ({} bytes)", file.name, file.size),
    };
    Ok(Extraction::text(text))
}

/// First rows of a CSV body, with a marker when rows were dropped.
pub fn csv_preview(name: &str, text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let preview = lines
        .iter()
        .take(CSV_PREVIEW_LINES)
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    let marker = if lines.len() > CSV_PREVIEW_LINES {
        CSV_TRUNCATION_MARKER
    } else {
        ""
    };
    format!("[CSV Data Preview from {name}]\n\n{preview}\n\n{marker}")
}

fn extract_spreadsheet(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    if extension_of(&file.name) == "csv" {
        return Ok(Extraction::text(csv_preview(&file.name, read_text(file)?)));
    }
    Ok(Extraction::text(format!(
        "[Spreadsheet Data from {}]\n\nWorkbook cells are not extracted yet; export the sheet as CSV for a data preview.\n\nFile size: {} bytes",
        file.name, file.size
    )))
}

fn extract_presentation(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    Ok(Extraction::text(format!(
        "[Presentation from {}]\n\nSlide text is not extracted yet; the file is stored with its details below.\n\nFile size: {} bytes\nType: {}",
        file.name, file.size, file.mime_type
    )))
}

fn extract_image(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    let text = format!(
        "[Image Analysis for {}]\n\nImage dimensions: Analyzing...\nFile size: {} bytes\nFormat: {}\n\nText recognition is not available; a preview thumbnail is attached where the format allows.",
        file.name, file.size, file.mime_type
    );
    // Vector images are not rasterised.
    let thumbnail = if extension_of(&file.name) == "svg" {
        None
    } else {
        Some(thumbnail_data_uri(&file.bytes)?)
    };
    Ok(Extraction {
        text,
        duration: None,
        thumbnail,
    })
}

fn extract_audio(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    let duration = file.size / AUDIO_BYTES_PER_SECOND;
    Ok(Extraction {
        text: format!(
            "[Audio Transcription from {}]\n\nTranscription pending. The duration below is estimated from the file size.\n\nEstimated duration: {} seconds\nFile size: {} bytes",
            file.name, duration, file.size
        ),
        duration: Some(duration),
        thumbnail: None,
    })
}

fn extract_video(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    let duration = file.size / VIDEO_BYTES_PER_SECOND;
    Ok(Extraction {
        text: format!(
            "[Video Analysis from {}]\n\nTranscription pending. The duration below is estimated from the file size.\n\nEstimated duration: {} seconds\nFile size: {} bytes",
            file.name, duration, file.size
        ),
        duration: Some(duration),
        thumbnail: Some(VIDEO_THUMBNAIL.to_string()),
    })
}

fn extract_code(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    let text = read_text(file)?;
    let language = language_for_extension(&extension_of(&file.name));
    Ok(Extraction::text(format!(
        "[Code File: {}]\nLanguage: {}\nLines: {}\nSize: {} bytes\n\n{}",
        file.name,
        language,
        text.split('\n').count(),
        file.size,
        text
    )))
}

fn extract_archive(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    Ok(Extraction::text(format!(
        "[Archive File: {}]\n\nArchive contents are not listed yet; the file is stored with its details below.\n\nFile size: {} bytes\nType: {}",
        file.name, file.size, file.mime_type
    )))
}

fn extract_unknown(file: &UploadedFile) -> Result<Extraction, ExtractError> {
    let text = match std::str::from_utf8(&file.bytes) {
        Ok(text) => format!("[Generic File: {}]\n\n{}", file.name, text),
        Err(_) => format!(
            "[Binary File: {}]\n\nThis appears to be a binary file that cannot be processed as text.\nFile size: {} bytes\nType: {}",
            file.name, file.size, file.mime_type
        ),
    };
    Ok(Extraction::text(text))
}
