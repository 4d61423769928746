//! DOCX text extraction via docx-rs.
//!
//! A .docx file is a ZIP of XML parts; docx-rs exposes the parsed document as
//! a tree of paragraphs, runs, hyperlinks, and tables. We walk that tree and
//! collect raw text only — styling and embedded objects are dropped.

use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild,
};

use crate::extraction::ExtractionError;

pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    // Pre-OOXML .doc files are OLE containers, not ZIPs; docx-rs cannot read
    // them and the failure deserves a clearer kind than "corrupt".
    if !bytes.starts_with(b"PK") {
        return Err(ExtractionError::UnsupportedFormat(
            "Legacy .doc files are not supported; please convert to .docx".to_string(),
        ));
    }

    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractionError::CorruptFile(format!("DOCX parse failed: {e:?}")))?;

    let mut text = String::new();
    for child in &docx.document.children {
        collect_child(child, &mut text);
    }
    Ok(text)
}

fn collect_child(child: &DocumentChild, output: &mut String) {
    match child {
        DocumentChild::Paragraph(paragraph) => {
            collect_paragraph_children(&paragraph.children, output);
            output.push('\n');
        }
        DocumentChild::Table(table) => {
            for row in &table.rows {
                let TableChild::TableRow(table_row) = row;
                for cell in &table_row.cells {
                    let TableRowChild::TableCell(table_cell) = cell;
                    for content in &table_cell.children {
                        if let TableCellContent::Paragraph(paragraph) = content {
                            collect_paragraph_children(&paragraph.children, output);
                            output.push(' ');
                        }
                    }
                }
                output.push('\n');
            }
        }
        _ => {}
    }
}

fn collect_paragraph_children(children: &[ParagraphChild], output: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => collect_run(run, output),
            // Hyperlinks wrap their display text in nested runs.
            ParagraphChild::Hyperlink(link) => {
                for nested in &link.children {
                    if let ParagraphChild::Run(run) = nested {
                        collect_run(run, output);
                    }
                }
            }
            _ => {}
        }
    }
}

fn collect_run(run: &docx_rs::Run, output: &mut String) {
    for child in &run.children {
        if let RunChild::Text(text) = child {
            output.push_str(&text.text);
        }
    }
}
