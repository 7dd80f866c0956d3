use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::autosave::{AutosaveConfig, AutosaveController, SaveOutcome};
use crate::codec::html;
use crate::docs::{Document, SharedStore, StoreError, UpdateDocumentInput};
use crate::notify::Notifier;

/// Failure to start an editing session. Terminal: the caller goes back to
/// the document list.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("failed to load document: {0}")]
    Load(#[from] StoreError),
}

/// One open document under edit.
///
/// Owns the autosave controller for its document; the session is created
/// only after the initial load succeeds and is the sole client-side writer
/// while open. `close` consumes the session and completes the final write
/// before returning, so a reopen never races a stale session's save.
pub struct EditorSession {
    document: Document,
    title: Mutex<String>,
    /// Live mirror of the rich text surface's serialized content
    content: Mutex<String>,
    autosave: AutosaveController,
    store: SharedStore,
    notifier: Notifier,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("document", &self.document)
            .field("title", &self.title)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Load the document and start a session for it
    pub async fn open(
        store: SharedStore,
        notifier: Notifier,
        config: AutosaveConfig,
        id: &str,
    ) -> Result<EditorSession, SessionError> {
        let document = store
            .get(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        log::debug!("opened session for document {}", document.id);
        let autosave =
            AutosaveController::new(&document.id, store.clone(), notifier.clone(), config);

        Ok(EditorSession {
            title: Mutex::new(document.title.clone()),
            content: Mutex::new(document.content.clone()),
            document,
            autosave,
            store,
            notifier,
        })
    }

    /// The document as initially loaded
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn title(&self) -> String {
        self.title.lock().unwrap().clone()
    }

    /// Current serialized content, including unsaved edits
    pub fn content(&self) -> String {
        self.content.lock().unwrap().clone()
    }

    /// Feed an edit event from the rich text surface
    pub fn on_content_changed(&self, content: impl Into<String>) {
        let content = content.into();
        *self.content.lock().unwrap() = content.clone();
        self.autosave.on_content_changed(content);
    }

    /// Manual save: flush any pending edit immediately
    pub async fn save_now(&self) -> SaveOutcome {
        self.autosave.flush_now().await
    }

    /// Rename the document. A pending body edit is flushed first so the
    /// title write never races the body write.
    pub async fn rename(&self, title: &str) -> Result<(), StoreError> {
        if self.autosave.has_pending() {
            let _ = self.autosave.flush_now().await;
        }

        match self
            .store
            .update(&self.document.id, UpdateDocumentInput::title(title))
            .await
        {
            Ok(()) => {
                *self.title.lock().unwrap() = title.to_string();
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .destructive(format!("Couldn't rename document: {}", err));
                Err(err)
            }
        }
    }

    /// Visible text of the current content
    pub fn plain_text(&self) -> String {
        html::plain_text(&self.content())
    }

    pub fn word_count(&self) -> usize {
        html::word_count(&self.content())
    }

    pub fn is_saving(&self) -> bool {
        self.autosave.is_writing()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.has_pending()
    }

    /// End the session with one final best-effort flush. A failed flush is
    /// reported through the notification channel but never blocks teardown.
    pub async fn close(self) -> SaveOutcome {
        let outcome = self.autosave.close().await;
        log::debug!("closed session for document {}", self.document.id);
        outcome
    }
}
