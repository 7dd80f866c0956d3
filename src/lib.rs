//! draftdesk: local-first document workspace engine.
//!
//! The headless core behind a document editor UI: SQLite-backed document
//! storage, a debounced single-flight autosave controller, DOCX
//! import/export, a pluggable identity provider, and a user-facing
//! notification channel. The rich text surface itself stays external; it
//! feeds serialized HTML into an [`session::EditorSession`] and the engine
//! takes care of persistence.
//!
//! Known limitation: the store is last-write-wins. Two sessions editing the
//! same document from different processes will not conflict-resolve; the
//! later write wins.

pub mod codec;
pub mod database;
pub mod docs;
pub mod identity;
pub mod notify;
pub mod session;
pub mod workspace;

pub use database::{Database, DbError};
pub use docs::{
    ContentStore, CreateDocumentInput, Document, DocumentFilter, SharedStore, SortOrder,
    SqliteContentStore, StoreError, UpdateDocumentInput,
};
pub use identity::{IdentityProvider, LocalIdentityProvider, SharedIdentity, UserIdentity};
pub use notify::{Notice, Notifier, Severity};
pub use session::{
    AutosaveConfig, AutosaveController, EditorSession, SaveOutcome, SessionError,
    DEFAULT_DEBOUNCE_MS,
};
pub use workspace::{Workspace, WorkspaceError};
