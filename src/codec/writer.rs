use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use super::html::{self, Block, BlockKind};
use super::types::CodecError;

fn block_to_paragraph(block: &Block) -> Paragraph {
    let mut paragraph = Paragraph::new();

    paragraph = match block.kind {
        BlockKind::Paragraph => paragraph,
        BlockKind::Heading(1) => paragraph.style("Heading1"),
        BlockKind::Heading(2) => paragraph.style("Heading2"),
        BlockKind::Heading(_) => paragraph.style("Heading3"),
    };

    for text_run in &block.runs {
        let mut run = Run::new().add_text(text_run.text.clone());
        if text_run.bold {
            run = run.bold();
        }
        if text_run.italic {
            run = run.italic();
        }
        paragraph = paragraph.add_run(run);
    }

    paragraph
}

/// Convert serialized HTML into a downloadable DOCX blob
pub fn export_docx(content: &str, title: &str) -> Result<Vec<u8>, CodecError> {
    let blocks = html::html_to_blocks(content);

    let mut docx = Docx::new();
    if blocks.is_empty() {
        // An empty document is valid; it still needs one paragraph
        docx = docx.add_paragraph(Paragraph::new());
    } else {
        for block in &blocks {
            docx = docx.add_paragraph(block_to_paragraph(block));
        }
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| CodecError::Encode(format!("could not write {}: {}", title, e)))?;

    log::info!("exported \"{}\" ({} blocks)", title, blocks.len());
    Ok(buffer.into_inner())
}
