//! DOCX rendering with docx-rs.
//!
//! One title paragraph from the uploader name, then one paragraph per source
//! line. Headings get bold runs at a larger size; run sizes are in half-points
//! (so 22 = 11pt).

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use crate::render::{is_heading, GenerationError};

const TITLE_SIZE: usize = 36;
const HEADING_SIZE: usize = 28;
const BODY_SIZE: usize = 22;

pub fn render(clean_text: &str, uploader_name: &str) -> Result<Vec<u8>, GenerationError> {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(uploader_name).bold().size(TITLE_SIZE)),
    );

    for line in clean_text.lines() {
        let paragraph = if line.trim().is_empty() {
            // Blank source lines become empty paragraphs: vertical spacing.
            Paragraph::new()
        } else if is_heading(line) {
            Paragraph::new().add_run(Run::new().add_text(line.trim()).bold().size(HEADING_SIZE))
        } else {
            Paragraph::new().add_run(Run::new().add_text(line.trim()).size(BODY_SIZE))
        };
        docx = docx.add_paragraph(paragraph);
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| GenerationError::EncodingFailure(format!("DOCX packing failed: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_a_zip_container() {
        let bytes = render("EXPERIENCE\nDid things, well.", "Jordan").unwrap();
        // Every .docx is a ZIP archive; PK\x03\x04 is the local-file header.
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_round_trips_through_the_extractor() {
        let bytes = render("EXPERIENCE\nDid things, well.\n\nEDUCATION", "Jordan").unwrap();
        let docx = docx_rs::read_docx(&bytes).expect("generated DOCX should parse");

        let mut text = String::new();
        for child in &docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for pc in &p.children {
                    if let docx_rs::ParagraphChild::Run(run) = pc {
                        for rc in &run.children {
                            if let docx_rs::RunChild::Text(t) = rc {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                text.push('\n');
            }
        }

        assert!(text.contains("Jordan"));
        assert!(text.contains("EXPERIENCE"));
        assert!(text.contains("Did things, well."));
        assert!(text.contains("EDUCATION"));
    }
}
