//! Bridge between serialized HTML and the codec's block model.
//!
//! The rich text surface speaks a small HTML dialect (paragraphs, headings,
//! bold, italic, line breaks). This module reads that dialect into blocks,
//! writes blocks back out, and derives plain text for word counting. Unknown
//! tags are dropped while their inner text is kept.

use regex::Regex;
use std::sync::OnceLock;

/// Block-level element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    /// Heading level 1..=3
    Heading(u8),
}

/// A run of text with uniform formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

/// One block-level element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<TextRun>,
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)(?:\s[^>]*)?/?>").expect("tag pattern")
    })
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

struct BlockBuilder {
    blocks: Vec<Block>,
    kind: BlockKind,
    runs: Vec<TextRun>,
    bold_depth: u32,
    italic_depth: u32,
}

impl BlockBuilder {
    fn new() -> Self {
        BlockBuilder {
            blocks: Vec::new(),
            kind: BlockKind::Paragraph,
            runs: Vec::new(),
            bold_depth: 0,
            italic_depth: 0,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let bold = self.bold_depth > 0;
        let italic = self.italic_depth > 0;
        // Merge into the previous run when the formatting matches
        if let Some(last) = self.runs.last_mut() {
            if last.bold == bold && last.italic == italic {
                last.text.push_str(text);
                return;
            }
        }
        self.runs.push(TextRun {
            text: text.to_string(),
            bold,
            italic,
        });
    }

    fn finish_block(&mut self, next_kind: BlockKind) {
        let mut runs = std::mem::take(&mut self.runs);
        if let Some(first) = runs.first_mut() {
            first.text = first.text.trim_start_matches(' ').to_string();
        }
        if let Some(last) = runs.last_mut() {
            last.text = last.text.trim_end_matches(' ').to_string();
        }
        runs.retain(|run| !run.text.is_empty());
        if !runs.is_empty() {
            self.blocks.push(Block {
                kind: self.kind,
                runs,
            });
        }
        self.kind = next_kind;
    }

    fn finish(mut self) -> Vec<Block> {
        self.finish_block(BlockKind::Paragraph);
        self.blocks
    }
}

/// Parse serialized HTML into blocks. Never fails; malformed markup
/// degrades to plain text.
pub fn html_to_blocks(html: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::new();
    let mut cursor = 0;

    for tag in tag_pattern().find_iter(html) {
        let text = &html[cursor..tag.start()];
        builder.push_text(&collapse_whitespace(&decode_entities(text)));
        cursor = tag.end();

        let raw = tag.as_str();
        let closing = raw.starts_with("</");
        let name = tag_pattern()
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();

        match name.as_str() {
            "p" | "div" | "li" => builder.finish_block(BlockKind::Paragraph),
            "h1" => builder.finish_block(if closing {
                BlockKind::Paragraph
            } else {
                BlockKind::Heading(1)
            }),
            "h2" => builder.finish_block(if closing {
                BlockKind::Paragraph
            } else {
                BlockKind::Heading(2)
            }),
            "h3" => builder.finish_block(if closing {
                BlockKind::Paragraph
            } else {
                BlockKind::Heading(3)
            }),
            "br" => builder.push_text("\n"),
            "strong" | "b" => {
                if closing {
                    builder.bold_depth = builder.bold_depth.saturating_sub(1);
                } else {
                    builder.bold_depth += 1;
                }
            }
            "em" | "i" => {
                if closing {
                    builder.italic_depth = builder.italic_depth.saturating_sub(1);
                } else {
                    builder.italic_depth += 1;
                }
            }
            _ => {} // unknown tag: keep inner text, drop the tag
        }
    }

    builder.push_text(&collapse_whitespace(&decode_entities(&html[cursor..])));
    builder.finish()
}

/// Render blocks back to the serialized HTML dialect
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        let tag = match block.kind {
            BlockKind::Paragraph => "p",
            BlockKind::Heading(1) => "h1",
            BlockKind::Heading(2) => "h2",
            BlockKind::Heading(_) => "h3",
        };
        out.push('<');
        out.push_str(tag);
        out.push('>');
        for run in &block.runs {
            let mut text = escape_text(&run.text).replace('\n', "<br>");
            if run.italic {
                text = format!("<em>{}</em>", text);
            }
            if run.bold {
                text = format!("<strong>{}</strong>", text);
            }
            out.push_str(&text);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out
}

/// Visible text of serialized HTML, blocks separated by newlines
pub fn plain_text(html: &str) -> String {
    let blocks = html_to_blocks(html);
    blocks
        .iter()
        .map(|block| {
            block
                .runs
                .iter()
                .map(|run| run.text.as_str())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of whitespace-separated words in the visible text
pub fn word_count(html: &str) -> usize {
    plain_text(html).split_whitespace().count()
}
