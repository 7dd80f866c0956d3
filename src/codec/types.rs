use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of importing a DOCX file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocxImport {
    /// Serialized HTML for the rich text surface
    pub html: String,
    /// Constructs the converter had to skip or approximate
    pub warnings: Vec<String>,
}

/// Codec failures. Terminal for the one operation only; no store state is
/// touched when these occur.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported file type \".{0}\"; only .docx files can be imported")]
    UnsupportedExtension(String),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Encode(String),
}
