use std::sync::Arc;
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::database::{Database, DbError};
use crate::docs::{
    CreateDocumentInput, Document, DocumentFilter, SharedStore, SortOrder, SqliteContentStore,
    StoreError,
};
use crate::identity::{SharedIdentity, UserIdentity};
use crate::notify::Notifier;
use crate::session::{AutosaveConfig, EditorSession, SessionError};

/// Errors returned to the caller alongside the user-facing notice
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not signed in")]
    NotSignedIn,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Wires the content store, identity provider, notification channel, and
/// autosave configuration together. This is the application-level entry
/// point.
///
/// Every async failure is caught here (or inside the session) and converted
/// into exactly one user-visible notice; the matching `Err` is returned so
/// the caller can adjust its view, but nothing propagates as a panic.
pub struct Workspace {
    store: SharedStore,
    identity: SharedIdentity,
    notifier: Notifier,
    autosave: AutosaveConfig,
}

impl Workspace {
    pub fn new(
        store: SharedStore,
        identity: SharedIdentity,
        notifier: Notifier,
        autosave: AutosaveConfig,
    ) -> Self {
        Workspace {
            store,
            identity,
            notifier,
            autosave,
        }
    }

    /// Workspace backed by the local SQLite database
    pub fn with_local_store(
        db: Database,
        identity: SharedIdentity,
        notifier: Notifier,
    ) -> Result<Self, DbError> {
        db.create_docs_table()?;
        let store: SharedStore = Arc::new(SqliteContentStore::new(Arc::new(db)));
        Ok(Self::new(store, identity, notifier, AutosaveConfig::default()))
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    fn owner(&self) -> Result<UserIdentity, WorkspaceError> {
        self.identity
            .current_user()
            .ok_or(WorkspaceError::NotSignedIn)
    }

    /// The signed-in user's documents, most recently updated first
    pub async fn list_documents(&self) -> Result<Vec<Document>, WorkspaceError> {
        let owner = self.owner()?;
        match self
            .store
            .list(DocumentFilter::owned_by(owner.id), SortOrder::UpdatedDesc)
            .await
        {
            Ok(documents) => Ok(documents),
            Err(err) => {
                self.notifier
                    .destructive(format!("Couldn't load your documents: {}", err));
                Err(err.into())
            }
        }
    }

    pub async fn create_document(&self, title: &str) -> Result<Document, WorkspaceError> {
        let owner = self.owner()?;
        let input = CreateDocumentInput {
            title: title.to_string(),
            content: None,
            owner_id: owner.id,
        };
        match self.store.create(input).await {
            Ok(document) => Ok(document),
            Err(err) => {
                self.notifier
                    .destructive(format!("Couldn't create \"{}\": {}", title, err));
                Err(err.into())
            }
        }
    }

    /// Open a document for editing. On load failure the session is never
    /// constructed; the caller returns to the list view.
    pub async fn open_document(&self, id: &str) -> Result<EditorSession, WorkspaceError> {
        match EditorSession::open(
            self.store.clone(),
            self.notifier.clone(),
            self.autosave,
            id,
        )
        .await
        {
            Ok(session) => Ok(session),
            Err(err) => {
                self.notifier
                    .destructive(format!("Couldn't open document: {}", err));
                Err(err.into())
            }
        }
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), WorkspaceError> {
        match self.store.delete(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.notifier
                    .destructive(format!("Couldn't delete document: {}", err));
                Err(err.into())
            }
        }
    }

    /// Import a DOCX file as a new document. Conversion failures abort
    /// before any store mutation; converter warnings surface as
    /// informational notices.
    pub async fn import_docx_as_document(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Document, WorkspaceError> {
        let owner = self.owner()?;

        let imported = match codec::import_docx(file_name, bytes) {
            Ok(imported) => imported,
            Err(err) => {
                self.notifier
                    .destructive(format!("Couldn't import \"{}\": {}", file_name, err));
                return Err(err.into());
            }
        };
        for warning in &imported.warnings {
            self.notifier.info(warning.clone());
        }

        let title = file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or("Imported document");

        let input = CreateDocumentInput {
            title: title.to_string(),
            content: Some(imported.html),
            owner_id: owner.id,
        };
        match self.store.create(input).await {
            Ok(document) => Ok(document),
            Err(err) => {
                self.notifier
                    .destructive(format!("Couldn't save imported \"{}\": {}", title, err));
                Err(err.into())
            }
        }
    }

    /// Export the live session content as a DOCX blob; unsaved edits are
    /// included
    pub async fn export_document(
        &self,
        session: &EditorSession,
    ) -> Result<Vec<u8>, WorkspaceError> {
        match codec::export_docx(&session.content(), &session.title()) {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                self.notifier
                    .destructive(format!("Couldn't export \"{}\": {}", session.title(), err));
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::html;
    use crate::identity::LocalIdentityProvider;
    use crate::notify::Severity;

    type NoticeReceiver = tokio::sync::mpsc::UnboundedReceiver<crate::notify::Notice>;

    fn workspace() -> (Workspace, Arc<LocalIdentityProvider>, NoticeReceiver) {
        let _ = env_logger::builder().is_test(true).try_init();
        let db = Database::open_in_memory().unwrap();
        let identity = Arc::new(LocalIdentityProvider::new());
        let (notifier, notices) = Notifier::channel();
        let ws = Workspace::with_local_store(db, identity.clone(), notifier).unwrap();
        (ws, identity, notices)
    }

    #[tokio::test]
    async fn test_listing_requires_sign_in() {
        let (ws, _identity, _notices) = workspace();
        assert!(matches!(
            ws.list_documents().await,
            Err(WorkspaceError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_create_and_list_own_documents() {
        let (ws, identity, _notices) = workspace();
        identity.sign_in("Ada", None);

        ws.create_document("First").await.unwrap();
        ws.create_document("Second").await.unwrap();

        let docs = ws.list_documents().await.unwrap();
        assert_eq!(docs.len(), 2);
        // Most recently updated first
        assert_eq!(docs[0].title, "Second");
    }

    #[tokio::test]
    async fn test_open_missing_document_notifies_once() {
        let (ws, identity, mut notices) = workspace();
        identity.sign_in("Ada", None);

        assert!(ws.open_document("missing").await.is_err());
        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.severity, Severity::Destructive);
        assert!(notices.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_edit_session_through_workspace() {
        let (ws, identity, _notices) = workspace();
        identity.sign_in("Ada", None);

        let doc = ws.create_document("Journal").await.unwrap();
        let session = ws.open_document(&doc.id).await.unwrap();
        session.on_content_changed("<p>day one</p>");
        session.close().await;

        let docs = ws.list_documents().await.unwrap();
        assert_eq!(docs[0].content, "<p>day one</p>");
    }

    #[tokio::test]
    async fn test_import_bad_extension_aborts_before_store_mutation() {
        let (ws, identity, mut notices) = workspace();
        identity.sign_in("Ada", None);

        let result = ws.import_docx_as_document("notes.txt", b"whatever").await;
        assert!(matches!(
            result,
            Err(WorkspaceError::Codec(CodecError::UnsupportedExtension(_)))
        ));
        assert_eq!(notices.try_recv().unwrap().severity, Severity::Destructive);
        assert!(ws.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_then_export_round_trip() {
        let (ws, identity, _notices) = workspace();
        identity.sign_in("Ada", None);

        let original = "<h1>Minutes</h1><p>The meeting opened at <strong>nine</strong>.</p>";
        let blob = codec::export_docx(original, "Minutes").unwrap();

        let doc = ws.import_docx_as_document("Minutes.docx", &blob).await.unwrap();
        assert_eq!(doc.title, "Minutes");
        assert_eq!(html::plain_text(&doc.content), html::plain_text(original));

        let session = ws.open_document(&doc.id).await.unwrap();
        let exported = ws.export_document(&session).await.unwrap();
        assert_eq!(&exported[..2], b"PK");
        session.close().await;
    }
}
