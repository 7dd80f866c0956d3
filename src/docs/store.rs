use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::types::{CreateDocumentInput, Document, DocumentFilter, SortOrder, UpdateDocumentInput};
use crate::database::Database;

/// Errors surfaced by a content store. Backend failure reasons are opaque
/// beyond a human-readable message.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
}

/// The persistence boundary for documents.
///
/// Last-write-wins semantics; no transactional guarantees beyond a single
/// call. The autosave controller layers its single-flight guarantee on top.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;

    async fn create(&self, input: CreateDocumentInput) -> Result<Document, StoreError>;

    /// Apply a partial update. Fails with `NotFound` if the document does
    /// not exist; `updated_at` is rewritten on success.
    async fn update(&self, id: &str, input: UpdateDocumentInput) -> Result<(), StoreError>;

    async fn list(
        &self,
        filter: DocumentFilter,
        order: SortOrder,
    ) -> Result<Vec<Document>, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn ContentStore>;

/// `ContentStore` backed by the local SQLite database. Blocking rusqlite
/// calls run on the tokio blocking pool.
pub struct SqliteContentStore {
    db: Arc<Database>,
}

impl SqliteContentStore {
    pub fn new(db: Arc<Database>) -> Self {
        SqliteContentStore { db }
    }
}

async fn run_blocking<T, F>(db: Arc<Database>, f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> Result<T, crate::database::DbError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| StoreError::Backend(format!("storage task failed: {}", e)))?
        .map_err(|e| StoreError::Backend(e.to_string()))
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let id = id.to_string();
        run_blocking(self.db.clone(), move |db| db.get_document(&id)).await
    }

    async fn create(&self, input: CreateDocumentInput) -> Result<Document, StoreError> {
        run_blocking(self.db.clone(), move |db| db.create_document(&input)).await
    }

    async fn update(&self, id: &str, input: UpdateDocumentInput) -> Result<(), StoreError> {
        let key = id.to_string();
        let updated =
            run_blocking(self.db.clone(), move |db| db.update_document(&key, &input)).await?;
        match updated {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn list(
        &self,
        filter: DocumentFilter,
        order: SortOrder,
    ) -> Result<Vec<Document>, StoreError> {
        run_blocking(self.db.clone(), move |db| db.list_documents(&filter, order)).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let key = id.to_string();
        let deleted = run_blocking(self.db.clone(), move |db| db.delete_document(&key)).await?;
        if deleted {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteContentStore {
        let db = Database::open_in_memory().unwrap();
        db.create_docs_table().unwrap();
        SqliteContentStore::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_create_update_get() {
        let store = test_store();
        let doc = store
            .create(CreateDocumentInput {
                title: "Untitled".to_string(),
                content: Some("<p>start</p>".to_string()),
                owner_id: "user-1".to_string(),
            })
            .await
            .unwrap();

        store
            .update(&doc.id, UpdateDocumentInput::content("<p>edited</p>"))
            .await
            .unwrap();

        let fetched = store.get(&doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "<p>edited</p>");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = test_store();
        let err = store
            .update("missing", UpdateDocumentInput::content("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_order() {
        let store = test_store();
        for title in ["beta", "Alpha", "gamma"] {
            store
                .create(CreateDocumentInput {
                    title: title.to_string(),
                    content: None,
                    owner_id: "user-1".to_string(),
                })
                .await
                .unwrap();
        }

        let docs = store
            .list(DocumentFilter::owned_by("user-1"), SortOrder::TitleAsc)
            .await
            .unwrap();
        let titles: Vec<_> = docs.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "beta", "gamma"]);
    }
}
