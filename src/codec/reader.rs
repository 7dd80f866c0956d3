use docx_rs::{DocumentChild, ParagraphChild, RunChild};

use super::html::{self, Block, BlockKind, TextRun};
use super::types::{CodecError, DocxImport};

/// Accepted import file extension
pub const DOCX_EXTENSION: &str = "docx";

fn extension_of(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext)
}

/// Check the file name before touching any bytes
pub fn check_extension(file_name: &str) -> Result<(), CodecError> {
    match extension_of(file_name) {
        Some(ext) if ext.eq_ignore_ascii_case(DOCX_EXTENSION) => Ok(()),
        Some(ext) => Err(CodecError::UnsupportedExtension(ext.to_string())),
        None => Err(CodecError::UnsupportedExtension(String::new())),
    }
}

fn heading_level(style: &str) -> Option<u8> {
    match style {
        "Heading1" | "Title" => Some(1),
        "Heading2" => Some(2),
        "Heading3" => Some(3),
        _ => None,
    }
}

fn paragraph_to_block(paragraph: &docx_rs::Paragraph) -> Block {
    let kind = paragraph
        .property
        .style
        .as_ref()
        .and_then(|style| heading_level(&style.val))
        .map(BlockKind::Heading)
        .unwrap_or(BlockKind::Paragraph);

    let mut runs = Vec::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            let mut text = String::new();
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Break(_) => text.push('\n'),
                    RunChild::Tab(_) => text.push(' '),
                    _ => {}
                }
            }
            if text.is_empty() {
                continue;
            }
            runs.push(TextRun {
                text,
                bold: run.run_property.bold.is_some(),
                italic: run.run_property.italic.is_some(),
            });
        }
    }

    Block { kind, runs }
}

/// Convert a DOCX file into the serialized HTML dialect.
///
/// Unsupported constructs (tables, embedded objects) are skipped with a
/// warning rather than failing the whole import.
pub fn import_docx(file_name: &str, bytes: &[u8]) -> Result<DocxImport, CodecError> {
    check_extension(file_name)?;

    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| CodecError::Parse(format!("could not parse {}: {:?}", file_name, e)))?;

    let mut blocks = Vec::new();
    let mut warnings = Vec::new();
    let mut tables_skipped = 0usize;

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                let block = paragraph_to_block(paragraph);
                if !block.runs.is_empty() {
                    blocks.push(block);
                }
            }
            DocumentChild::Table(_) => tables_skipped += 1,
            _ => {}
        }
    }

    if tables_skipped > 0 {
        warnings.push(format!(
            "{} table(s) were skipped; tables are not supported yet",
            tables_skipped
        ));
    }

    log::info!(
        "imported {}: {} block(s), {} warning(s)",
        file_name,
        blocks.len(),
        warnings.len()
    );

    Ok(DocxImport {
        html: html::blocks_to_html(&blocks),
        warnings,
    })
}
