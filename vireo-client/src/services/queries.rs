//! Read-only projections over posts, profiles, and like edges
//!
//! Every call is a single stateless request against the store; nothing is
//! cached on the client side.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::domain::{LikeEdge, Post, UserProfile};
use crate::error::{ClientError, Result};
use crate::store::{DocumentStore, Identity, Order, Query};

/// Default number of posts returned by [`QueryService::latest_posts`]
pub const DEFAULT_LATEST_LIMIT: u32 = 7;

/// Read-only query façade
#[derive(Clone)]
pub struct QueryService {
    documents: Arc<dyn DocumentStore>,
    identity: Arc<dyn Identity>,
    users_collection: String,
    posts_collection: String,
    likes_collection: String,
}

impl QueryService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        identity: Arc<dyn Identity>,
        config: &Config,
    ) -> Self {
        Self {
            documents,
            identity,
            users_collection: config.database.users_collection.clone(),
            posts_collection: config.database.posts_collection.clone(),
            likes_collection: config.database.likes_collection.clone(),
        }
    }

    /// All posts, newest first
    pub async fn all_posts(&self) -> Result<Vec<Post>> {
        self.posts(Query::new().order(Order::NewestFirst)).await
    }

    /// The latest posts, newest first, bounded by `limit` (default 7)
    pub async fn latest_posts(&self, limit: Option<u32>) -> Result<Vec<Post>> {
        self.posts(
            Query::new()
                .order(Order::NewestFirst)
                .limit(limit.unwrap_or(DEFAULT_LATEST_LIMIT)),
        )
        .await
    }

    /// Posts created by one profile, newest first
    pub async fn user_posts(&self, creator_user_id: Uuid) -> Result<Vec<Post>> {
        self.posts(
            Query::new()
                .equal("creator", creator_user_id.to_string())
                .order(Order::NewestFirst),
        )
        .await
    }

    /// Full-text search on post titles
    pub async fn search_posts(&self, term: &str) -> Result<Vec<Post>> {
        self.posts(Query::new().search("title", term)).await
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        let doc = self
            .documents
            .get_document(&self.posts_collection, post_id)
            .await?;
        Post::from_document(doc)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let doc = self
            .documents
            .get_document(&self.users_collection, user_id)
            .await?;
        UserProfile::from_document(doc)
    }

    /// Profile of the active account
    pub async fn current_profile(&self) -> Result<UserProfile> {
        let account = self.identity.current_account().await?;
        let docs = self
            .documents
            .list_documents(
                &self.users_collection,
                Query::new()
                    .equal("account_id", account.id.to_string())
                    .limit(1),
            )
            .await?;
        let doc = docs.into_iter().next().ok_or_else(|| {
            ClientError::NotFound(format!("no profile for account {}", account.id))
        })?;
        UserProfile::from_document(doc)
    }

    /// Ids of the posts a user liked, most recent like first
    pub async fn liked_post_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let edges = self
            .documents
            .list_documents(
                &self.likes_collection,
                Query::new()
                    .equal("user_id", user_id.to_string())
                    .order(Order::NewestFirst),
            )
            .await?;
        edges
            .into_iter()
            .map(|doc| LikeEdge::from_document(doc).map(|edge| edge.post_id))
            .collect()
    }

    /// The posts a user liked
    pub async fn liked_posts(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let ids = self.liked_post_ids(user_id).await?;
        if ids.is_empty() {
            // an empty `In` filter is rejected by several backends
            return Ok(Vec::new());
        }
        self.posts(Query::new().in_set("id", ids.iter().map(Uuid::to_string)))
            .await
    }

    /// Ids of the users who liked a post
    pub async fn post_likers(&self, post_id: Uuid) -> Result<Vec<Uuid>> {
        let edges = self
            .documents
            .list_documents(
                &self.likes_collection,
                Query::new()
                    .equal("post_id", post_id.to_string())
                    .order(Order::NewestFirst),
            )
            .await?;
        edges
            .into_iter()
            .map(|doc| LikeEdge::from_document(doc).map(|edge| edge.user_id))
            .collect()
    }

    async fn posts(&self, query: Query) -> Result<Vec<Post>> {
        let docs = self
            .documents
            .list_documents(&self.posts_collection, query)
            .await?;
        docs.into_iter().map(Post::from_document).collect()
    }
}
