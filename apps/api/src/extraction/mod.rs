//! Format detection and text extraction for uploaded resumes.
//!
//! Classification order: declared MIME type first, file-name extension second,
//! plain text as the catch-all. Extraction must never hand an empty string to
//! the enhancement pipeline — an empty result is a hard failure here, not a
//! downstream concern.

mod docx;
mod format;
mod pdf;

pub use format::{DocumentFormat, DOCX_MIME};

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// Immutable uploaded document, owned by a single pipeline invocation.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

/// Normalized extraction output: trimmed, non-empty text plus the format tag.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub format: DocumentFormat,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not read the file: {0}")]
    CorruptFile(String),

    #[error("No text could be extracted from the uploaded file")]
    EmptyContent,
}

/// Extracts plain text from an uploaded document.
///
/// Postcondition: the returned text is trimmed and non-empty.
pub fn extract(doc: &SourceDocument) -> Result<ExtractedText, ExtractionError> {
    let format = DocumentFormat::detect(doc.content_type.as_deref(), doc.file_name.as_deref());

    let raw = match format {
        DocumentFormat::Pdf => pdf::extract_text(&doc.bytes)?,
        DocumentFormat::Docx => docx::extract_text(&doc.bytes)?,
        DocumentFormat::Txt => String::from_utf8_lossy(&doc.bytes).into_owned(),
    };

    let text = raw.trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::EmptyContent);
    }

    debug!(
        format = format.extension(),
        chars = text.len(),
        "extracted resume text"
    );

    Ok(ExtractedText { text, format })
}
