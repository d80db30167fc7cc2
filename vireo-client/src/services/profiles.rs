//! Profile provisioning
//!
//! One profile document per account, created at sign-up. Account and
//! session handling stay with the identity provider; this service only
//! writes the document.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::domain::UserProfile;
use crate::error::{ClientError, Result};
use crate::store::{DocumentStore, Query};

#[derive(Clone)]
pub struct ProfileService {
    documents: Arc<dyn DocumentStore>,
    users_collection: String,
    endpoint: String,
}

impl ProfileService {
    pub fn new(documents: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self {
            documents,
            users_collection: config.database.users_collection.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Create the 1:1 profile document for a freshly registered account
    pub async fn create_profile(
        &self,
        account_id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<UserProfile> {
        if username.trim().is_empty() {
            return Err(ClientError::Validation("username must not be empty".to_string()));
        }
        if email.trim().is_empty() {
            return Err(ClientError::Validation("email must not be empty".to_string()));
        }

        let existing = self
            .documents
            .list_documents(
                &self.users_collection,
                Query::new()
                    .equal("account_id", account_id.to_string())
                    .limit(1),
            )
            .await?;
        if !existing.is_empty() {
            return Err(ClientError::Duplicate(format!(
                "profile already exists for account {account_id}"
            )));
        }

        let fields = serde_json::json!({
            "account_id": account_id,
            "username": username,
            "email": email,
            "avatar": initials_avatar_url(&self.endpoint, username),
            "followers": [],
            "follow": [],
        });
        let doc = self
            .documents
            .create_document(&self.users_collection, None, fields)
            .await?;
        UserProfile::from_document(doc)
    }
}

/// Initials avatar URL served by the backend's avatar endpoint
pub fn initials_avatar_url(endpoint: &str, username: &str) -> String {
    format!(
        "{}/avatars/initials?name={}",
        endpoint,
        urlencoding::encode(username)
    )
}
