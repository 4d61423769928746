//! PDF text extraction.
//!
//! `pdf-extract`'s plain-text device reconstructs line boundaries from the
//! vertical text-cursor position (a new line is emitted when the y coordinate
//! of successive text runs jumps past a small threshold), which is exactly the
//! paragraph-recovery behavior this pipeline relies on. We extract page by
//! page and join pages with a blank line so section breaks survive.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::ExtractionError;

static RE_EXCESS_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractionError::CorruptFile(format!("PDF parse failed: {e}")))?;

    let joined = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    // Token-level extraction leaves runs of blank lines inside a page; collapse
    // them so downstream heuristics see at most one blank line in a row.
    Ok(RE_EXCESS_BLANK.replace_all(&joined, "\n\n").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_bytes_are_rejected() {
        let result = extract_text(b"definitely not a pdf");
        assert!(matches!(result, Err(ExtractionError::CorruptFile(_))));
    }

    #[test]
    fn test_blank_line_collapse() {
        let collapsed = RE_EXCESS_BLANK.replace_all("a\n\n\n\n\nb", "\n\n");
        assert_eq!(collapsed, "a\n\nb");
    }
}
