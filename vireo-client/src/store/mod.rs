//! Remote store boundary
//!
//! The hosted backend is the sole shared mutable resource; these traits are
//! the contract the services consume. [`http::HttpStore`] talks to the real
//! backend, [`memory::MemoryStore`] implements the same contract in process.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Account, MediaKind, MediaUpload};
use crate::error::Result;

/// Preview geometry for image thumbnails
pub const PREVIEW_WIDTH: u32 = 2000;
pub const PREVIEW_HEIGHT: u32 = 2000;
pub const PREVIEW_GRAVITY: &str = "top";
pub const PREVIEW_QUALITY: u32 = 100;

/// A raw document as held by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// Store-assigned creation timestamp, the only ordering key
    pub created_at: DateTime<Utc>,
    /// Field payload; always a JSON object
    pub fields: Value,
}

/// A single filter predicate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// Field equals the given value
    Equal { field: String, value: Value },
    /// Full-text match on a string field
    Search { field: String, term: String },
    /// Field value is one of the given values; an array field matches when
    /// any element does
    In { field: String, values: Vec<Value> },
}

/// Result ordering on the creation timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    NewestFirst,
    OldestFirst,
}

/// Listing query: filter predicates, optional ordering, optional limit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Equal {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn search(mut self, field: &str, term: &str) -> Self {
        self.filters.push(Filter::Search {
            field: field.to_string(),
            term: term.to_string(),
        });
        self
    }

    pub fn in_set<I, T>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.filters.push(Filter::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Document CRUD against one database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, collection: &str, id: Uuid) -> Result<Document>;

    async fn list_documents(&self, collection: &str, query: Query) -> Result<Vec<Document>>;

    /// Create a document; the store assigns the id when `id` is `None`
    async fn create_document(
        &self,
        collection: &str,
        id: Option<Uuid>,
        fields: Value,
    ) -> Result<Document>;

    /// Merge `fields` into the document, leaving other fields untouched
    async fn update_document(&self, collection: &str, id: Uuid, fields: Value)
        -> Result<Document>;

    async fn delete_document(&self, collection: &str, id: Uuid) -> Result<()>;
}

/// File CRUD against one bucket
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Upload a picked asset; returns the store-assigned file id
    async fn upload_file(&self, bucket: &str, upload: &MediaUpload) -> Result<String>;

    async fn delete_file(&self, bucket: &str, file_id: &str) -> Result<()>;

    /// URL for rendering a stored file: a direct view URL for videos, a
    /// resized/cropped preview URL for images
    fn file_preview_url(&self, bucket: &str, file_id: &str, kind: MediaKind) -> String;
}

/// Identity surface of the backend
#[async_trait]
pub trait Identity: Send + Sync {
    /// The active account; fails when no session exists
    async fn current_account(&self) -> Result<Account>;
}
