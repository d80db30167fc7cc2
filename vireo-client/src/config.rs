/// Configuration management for the Vireo client core
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the hosted backend (no trailing slash)
    pub endpoint: String,
    /// Project identifier sent with every request
    pub project_id: String,
    /// Document database configuration
    pub database: DatabaseConfig,
    /// File storage configuration
    pub storage: StorageConfig,
    /// Session token of the active account, when one exists
    pub session_token: Option<String>,
}

/// Document database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database identifier
    pub database_id: String,
    /// User profile collection id
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    /// Post collection id
    #[serde(default = "default_posts_collection")]
    pub posts_collection: String,
    /// Like edge collection id
    #[serde(default = "default_likes_collection")]
    pub likes_collection: String,
}

/// File storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Media bucket id (videos and thumbnails share one bucket)
    #[serde(default = "default_bucket_id")]
    pub bucket_id: String,
}

// Default values
fn default_users_collection() -> String {
    "users".to_string()
}

fn default_posts_collection() -> String {
    "posts".to_string()
}

fn default_likes_collection() -> String {
    "likes".to_string()
}

fn default_bucket_id() -> String {
    "media".to_string()
}

fn default_endpoint() -> String {
    "https://cloud.vireo.app/v1".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("VIREO_ENDPOINT").unwrap_or_else(|_| default_endpoint());
        let project_id =
            std::env::var("VIREO_PROJECT_ID").context("VIREO_PROJECT_ID must be set")?;

        let database = DatabaseConfig {
            database_id: std::env::var("VIREO_DATABASE_ID")
                .context("VIREO_DATABASE_ID must be set")?,
            users_collection: std::env::var("VIREO_USERS_COLLECTION")
                .unwrap_or_else(|_| default_users_collection()),
            posts_collection: std::env::var("VIREO_POSTS_COLLECTION")
                .unwrap_or_else(|_| default_posts_collection()),
            likes_collection: std::env::var("VIREO_LIKES_COLLECTION")
                .unwrap_or_else(|_| default_likes_collection()),
        };

        let storage = StorageConfig {
            bucket_id: std::env::var("VIREO_BUCKET_ID").unwrap_or_else(|_| default_bucket_id()),
        };

        let session_token = std::env::var("VIREO_SESSION_TOKEN").ok();

        Ok(Config {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id,
            database,
            storage,
            session_token,
        })
    }
}
