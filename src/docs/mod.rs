//! Document model and persistence.
//!
//! `types` holds the document data model, `storage` the SQLite-backed
//! operations, and `store` the async `ContentStore` boundary the rest of
//! the crate talks to.

pub mod storage;
pub mod store;
pub mod types;

pub use store::*;
pub use types::*;
