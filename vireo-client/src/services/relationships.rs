//! Follow and like graph maintenance
//!
//! Follow pairings live on the two profile documents; like edges live in
//! their own collection and are queryable from either side. Writes are
//! read-modify-write against the remote store without an optimistic
//! concurrency token, so concurrent writers to the same profile can lose an
//! update (last writer wins).

use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{LikeEdge, UserProfile};
use crate::error::{ClientError, Result};
use crate::store::{Document, DocumentStore, Query};

/// Service maintaining the bidirectional follow graph and the like edge set
#[derive(Clone)]
pub struct RelationshipService {
    documents: Arc<dyn DocumentStore>,
    users_collection: String,
    posts_collection: String,
    likes_collection: String,
}

impl RelationshipService {
    pub fn new(documents: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self {
            documents,
            users_collection: config.database.users_collection.clone(),
            posts_collection: config.database.posts_collection.clone(),
            likes_collection: config.database.likes_collection.clone(),
        }
    }

    /// Create the follow pairing between two profiles.
    ///
    /// Updates both profile documents; the acting side is written first and
    /// rolled back if the follower-side write fails, so a one-sided pairing
    /// is never left behind by this call. A pairing already present on both
    /// sides is a duplicate; one present on a single side (from an earlier
    /// partial failure) is repaired.
    pub async fn follow(&self, acting_user_id: Uuid, target_user_id: Uuid) -> Result<()> {
        if acting_user_id == target_user_id {
            return Err(ClientError::Validation(
                "a user cannot follow themselves".to_string(),
            ));
        }

        let (acting, target) = tokio::try_join!(
            self.load_profile(acting_user_id),
            self.load_profile(target_user_id),
        )?;

        let already_following = acting.following.contains(&target_user_id);
        let already_follower = target.followers.contains(&acting_user_id);
        if already_following && already_follower {
            return Err(ClientError::Duplicate(format!(
                "user {acting_user_id} already follows {target_user_id}"
            )));
        }

        let mut following = acting.following.clone();
        if !already_following {
            following.push(target_user_id);
        }
        let mut followers = target.followers.clone();
        if !already_follower {
            followers.push(acting_user_id);
        }

        self.documents
            .update_document(
                &self.users_collection,
                acting_user_id,
                serde_json::json!({ "follow": following }),
            )
            .await?;

        if let Err(err) = self
            .documents
            .update_document(
                &self.users_collection,
                target_user_id,
                serde_json::json!({ "followers": followers }),
            )
            .await
        {
            self.restore_following(&acting, acting_user_id, target_user_id)
                .await;
            return Err(err);
        }

        Ok(())
    }

    /// Remove the follow pairing from both sides.
    ///
    /// Succeeds even when the pairing does not exist; more lenient than
    /// [`RelationshipService::follow`] by design.
    pub async fn unfollow(&self, acting_user_id: Uuid, target_user_id: Uuid) -> Result<()> {
        let (acting, target) = tokio::try_join!(
            self.load_profile(acting_user_id),
            self.load_profile(target_user_id),
        )?;

        if !acting.following.contains(&target_user_id)
            && !target.followers.contains(&acting_user_id)
        {
            return Ok(());
        }

        let following: Vec<Uuid> = acting
            .following
            .iter()
            .copied()
            .filter(|id| *id != target_user_id)
            .collect();
        let followers: Vec<Uuid> = target
            .followers
            .iter()
            .copied()
            .filter(|id| *id != acting_user_id)
            .collect();

        self.documents
            .update_document(
                &self.users_collection,
                acting_user_id,
                serde_json::json!({ "follow": following }),
            )
            .await?;

        if let Err(err) = self
            .documents
            .update_document(
                &self.users_collection,
                target_user_id,
                serde_json::json!({ "followers": followers }),
            )
            .await
        {
            self.restore_following(&acting, acting_user_id, target_user_id)
                .await;
            return Err(err);
        }

        Ok(())
    }

    /// Record that `user_id` liked `post_id`.
    ///
    /// The duplicate check runs before any write; on success exactly one
    /// like edge is created.
    pub async fn like(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        let (_post, _user) = tokio::try_join!(
            self.documents.get_document(&self.posts_collection, post_id),
            self.documents.get_document(&self.users_collection, user_id),
        )?;

        if !self.like_edges(user_id, post_id).await?.is_empty() {
            return Err(ClientError::Duplicate(format!(
                "user {user_id} already liked post {post_id}"
            )));
        }

        self.documents
            .create_document(
                &self.likes_collection,
                None,
                LikeEdge::fields(user_id, post_id),
            )
            .await?;
        Ok(())
    }

    /// Remove the like edge for (`user_id`, `post_id`); idempotent when none
    /// exists.
    pub async fn unlike(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        for edge in self.like_edges(user_id, post_id).await? {
            self.documents
                .delete_document(&self.likes_collection, edge.id)
                .await?;
        }
        Ok(())
    }

    async fn load_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let doc = self
            .documents
            .get_document(&self.users_collection, user_id)
            .await?;
        UserProfile::from_document(doc)
    }

    async fn like_edges(&self, user_id: Uuid, post_id: Uuid) -> Result<Vec<Document>> {
        self.documents
            .list_documents(
                &self.likes_collection,
                Query::new()
                    .equal("user_id", user_id.to_string())
                    .equal("post_id", post_id.to_string()),
            )
            .await
    }

    // best-effort rollback of the acting-side write
    async fn restore_following(
        &self,
        acting: &UserProfile,
        acting_user_id: Uuid,
        target_user_id: Uuid,
    ) {
        if let Err(err) = self
            .documents
            .update_document(
                &self.users_collection,
                acting_user_id,
                serde_json::json!({ "follow": acting.following }),
            )
            .await
        {
            error!(
                %acting_user_id, %target_user_id,
                "follow rollback failed, pairing left one-sided: {err}"
            );
        }
    }
}
