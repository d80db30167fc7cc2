//! Post lifecycle: create, edit, delete with media cleanup
//!
//! A post owns exactly one video file and one thumbnail file. Edits upload
//! replacements before the document is rewritten and reclaim the replaced
//! files only afterwards; a leaked file is cheaper than a live post pointing
//! at a missing one.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{MediaRef, MediaUpload, Post};
use crate::error::{ClientError, Result};
use crate::store::{DocumentStore, FileStore};

/// Fields of a new post; both assets must be freshly picked
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub prompt: String,
    pub video: MediaRef,
    pub thumbnail: MediaRef,
}

/// Fields of an edit; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub prompt: Option<String>,
    pub video: Option<MediaRef>,
    pub thumbnail: Option<MediaRef>,
}

enum MediaPlan {
    Keep,
    Replace(MediaUpload),
}

/// Service keeping post documents and their media assets consistent
#[derive(Clone)]
pub struct PostService {
    documents: Arc<dyn DocumentStore>,
    files: Arc<dyn FileStore>,
    users_collection: String,
    posts_collection: String,
    bucket: String,
}

impl PostService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        files: Arc<dyn FileStore>,
        config: &Config,
    ) -> Self {
        Self {
            documents,
            files,
            users_collection: config.database.users_collection.clone(),
            posts_collection: config.database.posts_collection.clone(),
            bucket: config.storage.bucket_id.clone(),
        }
    }

    /// Upload both assets and create the post document.
    ///
    /// The two uploads run concurrently. Any upload that succeeded is
    /// reclaimed when the sibling upload or the document write fails, so a
    /// failed create leaves no orphaned files behind.
    pub async fn create_post(&self, owner_user_id: Uuid, draft: PostDraft) -> Result<Post> {
        if draft.title.trim().is_empty() {
            return Err(ClientError::Validation("title must not be empty".to_string()));
        }
        let video = local_upload(draft.video, "video")?;
        let thumbnail = local_upload(draft.thumbnail, "thumbnail")?;

        // the owner must resolve to a profile before anything is uploaded
        self.documents
            .get_document(&self.users_collection, owner_user_id)
            .await?;

        let (video_result, thumbnail_result) = futures::join!(
            self.files.upload_file(&self.bucket, &video),
            self.files.upload_file(&self.bucket, &thumbnail),
        );
        let (video_id, thumbnail_id) = match (video_result, thumbnail_result) {
            (Ok(video_id), Ok(thumbnail_id)) => (video_id, thumbnail_id),
            (Ok(file_id), Err(err)) | (Err(err), Ok(file_id)) => {
                self.reclaim_file(&file_id).await;
                return Err(err);
            }
            (Err(err), Err(_)) => return Err(err),
        };

        let fields = serde_json::json!({
            "title": draft.title,
            "prompt": draft.prompt,
            "video": video_id,
            "thumbnail": thumbnail_id,
            "creator": owner_user_id,
        });
        match self
            .documents
            .create_document(&self.posts_collection, None, fields)
            .await
        {
            Ok(doc) => Post::from_document(doc),
            Err(err) => {
                futures::join!(
                    self.reclaim_file(&video_id),
                    self.reclaim_file(&thumbnail_id),
                );
                Err(err)
            }
        }
    }

    /// Apply an edit to a post owned by `editor_user_id`.
    ///
    /// Replacement assets are uploaded first; the document is rewritten to
    /// point at them; only then are the replaced files reclaimed. When the
    /// document write fails the fresh uploads are reclaimed instead and the
    /// post keeps its previous files.
    pub async fn edit_post(
        &self,
        post_id: Uuid,
        editor_user_id: Uuid,
        changes: PostEdit,
    ) -> Result<Post> {
        let doc = self
            .documents
            .get_document(&self.posts_collection, post_id)
            .await?;
        let post = Post::from_document(doc)?;
        if post.creator != editor_user_id {
            return Err(ClientError::Forbidden(format!(
                "user {editor_user_id} does not own post {post_id}"
            )));
        }

        let video_plan = media_plan(changes.video, &post.video)?;
        let thumbnail_plan = media_plan(changes.thumbnail, &post.thumbnail)?;

        let (video_staged, thumbnail_staged) = futures::join!(
            self.stage_media(video_plan),
            self.stage_media(thumbnail_plan),
        );
        let (staged_video, staged_thumbnail) = match (video_staged, thumbnail_staged) {
            (Ok(video), Ok(thumbnail)) => (video, thumbnail),
            (video, thumbnail) => {
                let mut first_err = None;
                for result in [video, thumbnail] {
                    match result {
                        Ok(Some(file_id)) => self.reclaim_file(&file_id).await,
                        Ok(None) => {}
                        Err(err) => {
                            if first_err.is_none() {
                                first_err = Some(err);
                            }
                        }
                    }
                }
                return Err(first_err.unwrap_or_else(|| {
                    ClientError::Transport("media staging failed".to_string())
                }));
            }
        };

        let fields = serde_json::json!({
            "title": changes.title.unwrap_or_else(|| post.title.clone()),
            "prompt": changes.prompt.unwrap_or_else(|| post.prompt.clone()),
            "video": staged_video.clone().unwrap_or_else(|| post.video.clone()),
            "thumbnail": staged_thumbnail.clone().unwrap_or_else(|| post.thumbnail.clone()),
        });
        let updated = match self
            .documents
            .update_document(&self.posts_collection, post_id, fields)
            .await
        {
            Ok(doc) => doc,
            Err(err) => {
                if let Some(file_id) = &staged_video {
                    self.reclaim_file(file_id).await;
                }
                if let Some(file_id) = &staged_thumbnail {
                    self.reclaim_file(file_id).await;
                }
                return Err(err);
            }
        };

        // replaced assets go away only once the document points elsewhere
        if staged_video.is_some() {
            self.reclaim_file(&post.video).await;
        }
        if staged_thumbnail.is_some() {
            self.reclaim_file(&post.thumbnail).await;
        }

        Post::from_document(updated)
    }

    /// Delete a post owned by `requester_user_id` along with both of its
    /// files.
    ///
    /// The two file deletes and the document delete are issued concurrently;
    /// completed deletions are not rolled back when a sibling call fails,
    /// the partial failure is surfaced instead.
    pub async fn delete_post(&self, post_id: Uuid, requester_user_id: Uuid) -> Result<()> {
        let doc = self
            .documents
            .get_document(&self.posts_collection, post_id)
            .await?;
        let post = Post::from_document(doc)?;
        if post.creator != requester_user_id {
            return Err(ClientError::Forbidden(format!(
                "user {requester_user_id} does not own post {post_id}"
            )));
        }

        let (video_result, thumbnail_result, document_result) = futures::join!(
            self.files.delete_file(&self.bucket, &post.video),
            self.files.delete_file(&self.bucket, &post.thumbnail),
            self.documents
                .delete_document(&self.posts_collection, post_id),
        );

        let mut failures = Vec::new();
        if let Err(err) = video_result {
            failures.push(format!("video file {}: {err}", post.video));
        }
        if let Err(err) = thumbnail_result {
            failures.push(format!("thumbnail file {}: {err}", post.thumbnail));
        }
        if let Err(err) = document_result {
            failures.push(format!("post document: {err}"));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Transport(format!(
                "post delete partially failed: {}",
                failures.join("; ")
            )))
        }
    }

    async fn stage_media(&self, plan: MediaPlan) -> Result<Option<String>> {
        match plan {
            MediaPlan::Keep => Ok(None),
            MediaPlan::Replace(upload) => {
                Ok(Some(self.files.upload_file(&self.bucket, &upload).await?))
            }
        }
    }

    async fn reclaim_file(&self, file_id: &str) {
        if let Err(err) = self.files.delete_file(&self.bucket, file_id).await {
            warn!(%file_id, "orphaned media reclaim failed: {err}");
        }
    }
}

fn local_upload(media: MediaRef, slot: &str) -> Result<MediaUpload> {
    match media {
        MediaRef::Local(upload) => Ok(upload),
        MediaRef::Remote(_) => Err(ClientError::Validation(format!(
            "a new post requires a freshly picked {slot}"
        ))),
    }
}

fn media_plan(change: Option<MediaRef>, current: &str) -> Result<MediaPlan> {
    match change {
        None => Ok(MediaPlan::Keep),
        Some(MediaRef::Remote(file_id)) if file_id == current => Ok(MediaPlan::Keep),
        Some(MediaRef::Remote(file_id)) => Err(ClientError::Validation(format!(
            "file {file_id} is not owned by this post"
        ))),
        Some(MediaRef::Local(upload)) => Ok(MediaPlan::Replace(upload)),
    }
}
