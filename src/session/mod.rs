//! Editing session lifecycle and the debounced autosave controller.
//!
//! `autosave` decouples the high-frequency edit stream from the slow write
//! path; `editor` owns one open document and ties the controller's lifetime
//! to the view.

pub mod autosave;
pub mod editor;

pub use autosave::*;
pub use editor::*;
