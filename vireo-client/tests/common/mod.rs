#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;
use vireo_client::config::{Config, DatabaseConfig, StorageConfig};
use vireo_client::domain::{MediaRef, MediaUpload, Post};
use vireo_client::services::{
    PostDraft, PostService, ProfileService, QueryService, RelationshipService,
};
use vireo_client::store::memory::MemoryStore;
use vireo_client::store::{DocumentStore, FileStore, Identity};

/// All services wired against one in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub config: Config,
    pub relationships: RelationshipService,
    pub posts: PostService,
    pub queries: QueryService,
    pub profiles: ProfileService,
}

pub fn test_config() -> Config {
    Config {
        endpoint: "https://api.example.com/v1".to_string(),
        project_id: "test-project".to_string(),
        database: DatabaseConfig {
            database_id: "db".to_string(),
            users_collection: "users".to_string(),
            posts_collection: "posts".to_string(),
            likes_collection: "likes".to_string(),
        },
        storage: StorageConfig {
            bucket_id: "media".to_string(),
        },
        session_token: None,
    }
}

impl TestApp {
    pub fn new() -> Self {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init()
            .ok();

        let store = Arc::new(MemoryStore::new());
        let config = test_config();
        let documents: Arc<dyn DocumentStore> = store.clone();
        let files: Arc<dyn FileStore> = store.clone();
        let identity: Arc<dyn Identity> = store.clone();

        Self {
            relationships: RelationshipService::new(documents.clone(), &config),
            posts: PostService::new(documents.clone(), files, &config),
            queries: QueryService::new(documents.clone(), identity, &config),
            profiles: ProfileService::new(documents, &config),
            store,
            config,
        }
    }

    pub async fn seed_user(&self, name: &str) -> Uuid {
        self.profiles
            .create_profile(Uuid::new_v4(), name, &format!("{name}@example.com"))
            .await
            .expect("seed profile")
            .id
    }

    pub async fn seed_post(&self, creator: Uuid, title: &str) -> Post {
        self.posts
            .create_post(creator, draft(title))
            .await
            .expect("seed post")
    }
}

pub fn draft(title: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        prompt: "prompt".to_string(),
        video: video_upload(title),
        thumbnail: image_upload(title),
    }
}

pub fn video_upload(name: &str) -> MediaRef {
    MediaRef::Local(MediaUpload {
        file_name: format!("{name}.mp4"),
        mime_type: "video/mp4".to_string(),
        data: vec![0x56, 0x49, 0x44],
    })
}

pub fn image_upload(name: &str) -> MediaRef {
    MediaRef::Local(MediaUpload {
        file_name: format!("{name}.png"),
        mime_type: "image/png".to_string(),
        data: vec![0x50, 0x4e, 0x47],
    })
}
