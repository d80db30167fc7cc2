//! In-process store backend
//!
//! Implements the full remote-store contract over [`DashMap`]. The test
//! suites run against it, and a development shell can use it to work without
//! a backend. Creation timestamps come from a monotonic counter so listing
//! order is deterministic.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Account, MediaKind, MediaUpload};
use crate::error::{ClientError, Result};
use crate::store::{
    Document, DocumentStore, FileStore, Filter, Identity, Order, Query, PREVIEW_GRAVITY,
    PREVIEW_HEIGHT, PREVIEW_QUALITY, PREVIEW_WIDTH,
};

const CLOCK_EPOCH: i64 = 1_700_000_000;

/// Operations a fault can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    CreateDocument,
    UpdateDocument,
    DeleteDocument,
    UploadFile,
    DeleteFile,
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    point: FaultPoint,
    document: Option<Uuid>,
}

#[derive(Debug, Clone)]
struct StoredFile {
    file_name: String,
    mime_type: String,
    data: Vec<u8>,
}

/// In-memory implementation of the document, file, and identity contracts
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, DashMap<Uuid, Document>>,
    buckets: DashMap<String, DashMap<String, StoredFile>>,
    session: Mutex<Option<Account>>,
    faults: Mutex<Vec<Fault>>,
    clock: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `account` the active session
    pub fn open_session(&self, account: Account) {
        if let Ok(mut session) = self.session.lock() {
            *session = Some(account);
        }
    }

    pub fn close_session(&self) {
        if let Ok(mut session) = self.session.lock() {
            *session = None;
        }
    }

    /// Fail the next operation of the given kind with a transport error
    pub fn fail_next(&self, point: FaultPoint) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push(Fault {
                point,
                document: None,
            });
        }
    }

    /// Fail the next operation of the given kind touching one document
    pub fn fail_document(&self, point: FaultPoint, document: Uuid) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push(Fault {
                point,
                document: Some(document),
            });
        }
    }

    pub fn file_exists(&self, bucket: &str, file_id: &str) -> bool {
        self.buckets
            .get(bucket)
            .map(|files| files.contains_key(file_id))
            .unwrap_or(false)
    }

    pub fn file_count(&self, bucket: &str) -> usize {
        self.buckets.get(bucket).map(|files| files.len()).unwrap_or(0)
    }

    /// Name and MIME type of a stored file, when present
    pub fn file_metadata(&self, bucket: &str, file_id: &str) -> Option<(String, String)> {
        self.buckets.get(bucket).and_then(|files| {
            files
                .get(file_id)
                .map(|file| (file.file_name.clone(), file.mime_type.clone()))
        })
    }

    pub fn file_size(&self, bucket: &str, file_id: &str) -> Option<usize> {
        self.buckets
            .get(bucket)
            .and_then(|files| files.get(file_id).map(|file| file.data.len()))
    }

    fn take_fault(&self, point: FaultPoint, document: Option<Uuid>) -> Result<()> {
        if let Ok(mut faults) = self.faults.lock() {
            let position = faults.iter().position(|fault| {
                fault.point == point && fault.document.map_or(true, |id| Some(id) == document)
            });
            if let Some(index) = position {
                faults.remove(index);
                return Err(ClientError::Transport(format!("injected fault: {point:?}")));
            }
        }
        Ok(())
    }

    fn next_created_at(&self) -> DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        DateTime::from_timestamp(CLOCK_EPOCH + tick, 0).unwrap_or_else(Utc::now)
    }
}

fn field_value(doc: &Document, field: &str) -> Option<Value> {
    if field == "id" {
        return Some(Value::String(doc.id.to_string()));
    }
    doc.fields.get(field).cloned()
}

fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::Equal { field, value } => field_value(doc, field).as_ref() == Some(value),
        Filter::Search { field, term } => match field_value(doc, field) {
            Some(Value::String(text)) => text.to_lowercase().contains(&term.to_lowercase()),
            _ => false,
        },
        Filter::In { field, values } => match field_value(doc, field) {
            Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
            Some(value) => values.contains(&value),
            None => false,
        },
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, collection: &str, id: Uuid) -> Result<Document> {
        let docs = self
            .collections
            .get(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let doc = docs.get(&id).ok_or_else(|| not_found(collection, id))?;
        Ok(doc.value().clone())
    }

    async fn list_documents(&self, collection: &str, query: Query) -> Result<Vec<Document>> {
        let mut results: Vec<Document> = match self.collections.get(collection) {
            Some(docs) => docs
                .iter()
                .filter(|entry| query.filters.iter().all(|f| matches(entry.value(), f)))
                .map(|entry| entry.value().clone())
                .collect(),
            None => Vec::new(),
        };

        match query.order {
            Some(Order::NewestFirst) => results.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Some(Order::OldestFirst) => results.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            None => results.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        if let Some(limit) = query.limit {
            results.truncate(limit as usize);
        }

        Ok(results)
    }

    async fn create_document(
        &self,
        collection: &str,
        id: Option<Uuid>,
        fields: Value,
    ) -> Result<Document> {
        let id = id.unwrap_or_else(Uuid::new_v4);
        self.take_fault(FaultPoint::CreateDocument, Some(id))?;

        if !fields.is_object() {
            return Err(ClientError::Validation(
                "document fields must be a JSON object".to_string(),
            ));
        }

        let docs = self.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(ClientError::Duplicate(format!(
                "document {id} already exists in {collection}"
            )));
        }

        let doc = Document {
            id,
            created_at: self.next_created_at(),
            fields,
        };
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: Uuid,
        fields: Value,
    ) -> Result<Document> {
        self.take_fault(FaultPoint::UpdateDocument, Some(id))?;

        let patch = match fields.as_object() {
            Some(patch) => patch.clone(),
            None => {
                return Err(ClientError::Validation(
                    "partial update fields must be a JSON object".to_string(),
                ))
            }
        };

        let docs = self
            .collections
            .get(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let mut doc = docs.get_mut(&id).ok_or_else(|| not_found(collection, id))?;

        let target = doc.value_mut().fields.as_object_mut().ok_or_else(|| {
            ClientError::Transport(format!("stored document {id} has non-object fields"))
        })?;
        for (key, value) in patch {
            target.insert(key, value);
        }

        Ok(doc.value().clone())
    }

    async fn delete_document(&self, collection: &str, id: Uuid) -> Result<()> {
        self.take_fault(FaultPoint::DeleteDocument, Some(id))?;

        let docs = self
            .collections
            .get(collection)
            .ok_or_else(|| not_found(collection, id))?;
        docs.remove(&id).ok_or_else(|| not_found(collection, id))?;
        Ok(())
    }
}

fn not_found(collection: &str, id: Uuid) -> ClientError {
    ClientError::NotFound(format!("document {id} not found in {collection}"))
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn upload_file(&self, bucket: &str, upload: &MediaUpload) -> Result<String> {
        self.take_fault(FaultPoint::UploadFile, None)?;

        let file_id = Uuid::new_v4().to_string();
        let files = self.buckets.entry(bucket.to_string()).or_default();
        files.insert(
            file_id.clone(),
            StoredFile {
                file_name: upload.file_name.clone(),
                mime_type: upload.mime_type.clone(),
                data: upload.data.clone(),
            },
        );
        Ok(file_id)
    }

    async fn delete_file(&self, bucket: &str, file_id: &str) -> Result<()> {
        self.take_fault(FaultPoint::DeleteFile, None)?;

        let files = self.buckets.get(bucket).ok_or_else(|| {
            ClientError::NotFound(format!("file {file_id} not found in bucket {bucket}"))
        })?;
        files.remove(file_id).ok_or_else(|| {
            ClientError::NotFound(format!("file {file_id} not found in bucket {bucket}"))
        })?;
        Ok(())
    }

    fn file_preview_url(&self, bucket: &str, file_id: &str, kind: MediaKind) -> String {
        match kind {
            MediaKind::Video => format!("memory://{bucket}/{file_id}/view"),
            MediaKind::Image => format!(
                "memory://{bucket}/{file_id}/preview?width={PREVIEW_WIDTH}&height={PREVIEW_HEIGHT}&gravity={PREVIEW_GRAVITY}&quality={PREVIEW_QUALITY}"
            ),
        }
    }
}

#[async_trait]
impl Identity for MemoryStore {
    async fn current_account(&self) -> Result<Account> {
        let session = self
            .session
            .lock()
            .map_err(|_| ClientError::Transport("identity state poisoned".to_string()))?;
        (*session).ok_or_else(|| ClientError::Transport("no active session".to_string()))
    }
}
