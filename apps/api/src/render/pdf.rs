//! PDF rendering with lopdf.
//!
//! Layout model: US-letter pages, 1" margins, a single title line from the
//! uploader name, then the resume body top to bottom. Lines wider than the
//! printable width wrap on word boundaries; when the cursor passes the bottom
//! margin a new page starts. Headings render in Helvetica-Bold at a larger
//! size, body lines in Helvetica, blank lines as vertical spacing.

use std::io::Cursor;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::render::{is_heading, GenerationError};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;

const TITLE_SIZE: i64 = 18;
const HEADING_SIZE: i64 = 13;
const BODY_SIZE: i64 = 11;

const TITLE_LEADING: i64 = 28;
const HEADING_LEADING: i64 = 20;
const BODY_LEADING: i64 = 15;
const BLANK_LEADING: i64 = 8;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Typesetting cursor: accumulates per-page operation lists and breaks to a
/// fresh page when the vertical position passes the bottom margin.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn write_line(&mut self, text: &str, font: &str, size: i64, leading: i64) {
        if self.y - leading < MARGIN {
            self.break_page();
        }
        self.y -= leading;
        self.current.push(Operation::new("BT", vec![]));
        self.current
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.current
            .push(Operation::new("Td", vec![MARGIN.into(), self.y.into()]));
        self.current.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(text))],
        ));
        self.current.push(Operation::new("ET", vec![]));
    }

    fn space(&mut self, leading: i64) {
        // Vertical space never forces a page break on its own.
        self.y = (self.y - leading).max(MARGIN);
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.current);
        self.pages
    }
}

pub fn render(clean_text: &str, uploader_name: &str) -> Result<Vec<u8>, GenerationError> {
    let mut writer = PageWriter::new();

    writer.write_line(uploader_name, BOLD_FONT, TITLE_SIZE, TITLE_LEADING);
    writer.space(BLANK_LEADING);

    for line in clean_text.lines() {
        if line.trim().is_empty() {
            writer.space(BLANK_LEADING);
        } else if is_heading(line) {
            writer.space(BLANK_LEADING / 2);
            for wrapped in wrap(line.trim(), max_chars(HEADING_SIZE)) {
                writer.write_line(&wrapped, BOLD_FONT, HEADING_SIZE, HEADING_LEADING);
            }
        } else {
            for wrapped in wrap(line.trim(), max_chars(BODY_SIZE)) {
                writer.write_line(&wrapped, REGULAR_FONT, BODY_SIZE, BODY_LEADING);
            }
        }
    }

    assemble(writer.finish())
}

/// Rough character budget for a line: Helvetica averages about half an em per
/// glyph, so the printable width divided by size/2 is close enough for a
/// plain-text resume.
fn max_chars(font_size: i64) -> usize {
    ((PAGE_WIDTH - 2 * MARGIN) * 2 / font_size) as usize
}

fn wrap(line: &str, max_chars: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            wrapped.push(std::mem::take(&mut current));
        }
        // A single word longer than the budget is hard-split.
        if word.chars().count() > max_chars {
            let mut chunk = String::new();
            for c in word.chars() {
                if chunk.chars().count() == max_chars {
                    wrapped.push(std::mem::take(&mut chunk));
                }
                chunk.push(c);
            }
            current = chunk;
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    if wrapped.is_empty() {
        wrapped.push(String::new());
    }
    wrapped
}

/// WinAnsi (Latin-1 superset) bytes for the standard-14 fonts; characters
/// outside the codepage degrade to '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code < 256 {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

fn assemble(page_ops: Vec<Vec<Operation>>) -> Result<Vec<u8>, GenerationError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_ops.len());
    for operations in page_ops {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| GenerationError::EncodingFailure(format!("PDF content stream: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Cursor::new(Vec::new());
    doc.save_to(&mut buffer)
        .map_err(|e| GenerationError::EncodingFailure(format!("PDF serialization: {e}")))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_a_parseable_single_page_pdf() {
        let bytes = render("EXPERIENCE\nDid things, well.", "Jordan").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&bytes).expect("generated PDF should parse");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_content_paginates() {
        let body = (0..200)
            .map(|i| format!("Line {i} of a fairly long resume body."))
            .collect::<Vec<_>>()
            .join("\n");
        let bytes = render(&body, "Jordan").unwrap();

        let doc = Document::load_mem(&bytes).expect("generated PDF should parse");
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_wrap_respects_word_boundaries() {
        let wrapped = wrap("one two three four five", 9);
        assert_eq!(wrapped, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn test_wrap_hard_splits_oversized_words() {
        let wrapped = wrap("abcdefghij", 4);
        assert_eq!(wrapped, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_short_line_is_unchanged() {
        assert_eq!(wrap("short", 80), vec!["short"]);
    }

    #[test]
    fn test_win_ansi_keeps_latin1_and_degrades_the_rest() {
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("日本"), vec![b'?', b'?']);
    }
}
