//! DOCX import/export.
//!
//! This module provides:
//! - Importing a DOCX blob into the serialized HTML the editor consumes
//! - Exporting serialized HTML back to a downloadable DOCX blob
//! - Plain-text extraction and word counting for the serialized HTML

pub mod html;
pub mod reader;
pub mod types;
pub mod writer;

pub use reader::{check_extension, import_docx, DOCX_EXTENSION};
pub use types::*;
pub use writer::export_docx;
