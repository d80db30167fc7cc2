//! HTTP store backend
//!
//! Thin `reqwest` client of the hosted backend's REST surface. One request
//! per trait call, JSON bodies, no retries; non-success statuses map onto
//! the error taxonomy and everything else surfaces as a transport error.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{Account, MediaKind, MediaUpload};
use crate::error::{ClientError, Result};
use crate::store::{
    Document, DocumentStore, FileStore, Identity, Query, PREVIEW_GRAVITY, PREVIEW_HEIGHT,
    PREVIEW_QUALITY, PREVIEW_WIDTH,
};

/// Store client for the hosted backend
pub struct HttpStore {
    http: Client,
    config: Config,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    id: String,
}

impl HttpStore {
    pub fn new(config: Config) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint, self.config.database.database_id, collection
        )
    }

    fn document_url(&self, collection: &str, id: Uuid) -> String {
        format!("{}/{}", self.documents_url(collection), id)
    }

    fn files_url(&self, bucket: &str) -> String {
        format!("{}/storage/buckets/{}/files", self.config.endpoint, bucket)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-Vireo-Project", self.config.project_id.as_str());
        match &self.config.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.to_string()
    } else {
        body
    };
    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::Validation(message),
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::Duplicate(message),
        _ => ClientError::Transport(format!("{status}: {message}")),
    })
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn get_document(&self, collection: &str, id: Uuid) -> Result<Document> {
        let response = self
            .authorized(self.http.get(self.document_url(collection, id)))
            .send()
            .await?;
        Ok(checked(response).await?.json::<Document>().await?)
    }

    async fn list_documents(&self, collection: &str, query: Query) -> Result<Vec<Document>> {
        let url = format!("{}/query", self.documents_url(collection));
        let response = self
            .authorized(self.http.post(url).json(&query))
            .send()
            .await?;
        Ok(checked(response)
            .await?
            .json::<ListResponse>()
            .await?
            .documents)
    }

    async fn create_document(
        &self,
        collection: &str,
        id: Option<Uuid>,
        fields: Value,
    ) -> Result<Document> {
        let body = serde_json::json!({ "id": id, "fields": fields });
        let response = self
            .authorized(self.http.post(self.documents_url(collection)).json(&body))
            .send()
            .await?;
        Ok(checked(response).await?.json::<Document>().await?)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: Uuid,
        fields: Value,
    ) -> Result<Document> {
        let body = serde_json::json!({ "fields": fields });
        let response = self
            .authorized(self.http.patch(self.document_url(collection, id)).json(&body))
            .send()
            .await?;
        Ok(checked(response).await?.json::<Document>().await?)
    }

    async fn delete_document(&self, collection: &str, id: Uuid) -> Result<()> {
        let response = self
            .authorized(self.http.delete(self.document_url(collection, id)))
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }
}

#[async_trait]
impl FileStore for HttpStore {
    async fn upload_file(&self, bucket: &str, upload: &MediaUpload) -> Result<String> {
        let url = format!(
            "{}?name={}",
            self.files_url(bucket),
            urlencoding::encode(&upload.file_name)
        );
        let response = self
            .authorized(
                self.http
                    .post(url)
                    .header("Content-Type", upload.mime_type.as_str())
                    .body(upload.data.clone()),
            )
            .send()
            .await?;
        Ok(checked(response).await?.json::<FileResponse>().await?.id)
    }

    async fn delete_file(&self, bucket: &str, file_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.files_url(bucket), file_id);
        let response = self.authorized(self.http.delete(url)).send().await?;
        checked(response).await?;
        Ok(())
    }

    fn file_preview_url(&self, bucket: &str, file_id: &str, kind: MediaKind) -> String {
        let base = format!("{}/{}", self.files_url(bucket), file_id);
        match kind {
            MediaKind::Video => format!("{base}/view"),
            MediaKind::Image => format!(
                "{base}/preview?width={PREVIEW_WIDTH}&height={PREVIEW_HEIGHT}&gravity={PREVIEW_GRAVITY}&quality={PREVIEW_QUALITY}"
            ),
        }
    }
}

#[async_trait]
impl Identity for HttpStore {
    async fn current_account(&self) -> Result<Account> {
        if self.config.session_token.is_none() {
            return Err(ClientError::Transport("no active session".to_string()));
        }
        let url = format!("{}/account", self.config.endpoint);
        let response = self.authorized(self.http.get(url)).send().await?;
        Ok(checked(response).await?.json::<Account>().await?)
    }
}
