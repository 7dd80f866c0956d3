use serde::{Deserialize, Serialize};

/// A document stored in the content store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String, // serialized HTML from the rich text surface
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a new document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentInput {
    pub title: String,
    pub content: Option<String>,
    pub owner_id: String,
}

/// Input for updating an existing document; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocumentInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateDocumentInput {
    pub fn content(content: impl Into<String>) -> Self {
        UpdateDocumentInput {
            title: None,
            content: Some(content.into()),
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        UpdateDocumentInput {
            title: Some(title.into()),
            content: None,
        }
    }
}

/// Filter for listing documents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub owner_id: Option<String>,
}

impl DocumentFilter {
    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        DocumentFilter {
            owner_id: Some(owner_id.into()),
        }
    }
}

/// Sort order for document listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    UpdatedDesc,
    CreatedDesc,
    TitleAsc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::UpdatedDesc
    }
}
