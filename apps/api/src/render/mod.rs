//! Document regeneration: clean resume text back into PDF, DOCX, or TXT bytes.
//!
//! All three renderers share one heading heuristic so the visual policy stays
//! tunable in a single place. The produced bytes are base64-encoded for the
//! download boundary; the encoding must round-trip exactly.

mod docx;
mod pdf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::debug;

use crate::extraction::DocumentFormat;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Document encoding failed: {0}")]
    EncodingFailure(String),
}

/// Renders clean resume text into bytes of the requested format.
pub fn generate(
    clean_text: &str,
    format: DocumentFormat,
    uploader_name: &str,
) -> Result<Vec<u8>, GenerationError> {
    let bytes = match format {
        DocumentFormat::Pdf => pdf::render(clean_text, uploader_name)?,
        DocumentFormat::Docx => docx::render(clean_text, uploader_name)?,
        DocumentFormat::Txt => clean_text.as_bytes().to_vec(),
    };
    debug!(
        format = format.extension(),
        bytes = bytes.len(),
        "rendered enhanced resume"
    );
    Ok(bytes)
}

/// Encodes rendered bytes for transport to the download boundary.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Heading heuristic shared by the PDF and DOCX renderers: a non-blank line is
/// a heading when its alphabetic characters are all uppercase, or when it ends
/// with a colon.
pub(crate) fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.ends_with(':') {
        return true;
    }
    let mut has_alpha = false;
    for c in trimmed.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_heading_all_uppercase() {
        assert!(is_heading("EXPERIENCE"));
        assert!(is_heading("WORK HISTORY"));
    }

    #[test]
    fn test_is_heading_colon_suffixed() {
        assert!(is_heading("Skills:"));
    }

    #[test]
    fn test_is_heading_rejects_body_lines() {
        assert!(!is_heading("Did things, well."));
        assert!(!is_heading(""));
        assert!(!is_heading("   "));
        // Digits alone never make a heading.
        assert!(!is_heading("2019 - 2023"));
    }

    #[test]
    fn test_txt_base64_round_trip_is_exact() {
        let clean = "EXPERIENCE\nDid things, well.\n\nEDUCATION\nSchool.";
        let bytes = generate(clean, DocumentFormat::Txt, "Jordan").unwrap();
        let encoded = to_base64(&bytes);
        let decoded = STANDARD.decode(&encoded).unwrap();
        assert_eq!(decoded, clean.as_bytes());
    }

    #[test]
    fn test_txt_bytes_are_untransformed() {
        let clean = "línea acentuada";
        let bytes = generate(clean, DocumentFormat::Txt, "Jordan").unwrap();
        assert_eq!(bytes, clean.as_bytes());
    }
}
