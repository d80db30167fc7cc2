use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::store::Document;

/// External identity record; only the id is read by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
}

/// User profile entity - one document per account (1:1)
///
/// `following` and `followers` are logically paired across documents: A
/// follows B iff B's id is in A's `following` and A's id is in B's
/// `followers`. The pairing is maintained by the relationship service, not
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    /// Avatar URL: computed initials URL or an uploaded-file view URL
    pub avatar: String,
    /// Profile ids of accounts following this profile
    pub followers: Vec<Uuid>,
    /// Profile ids this profile follows (wire name `follow`)
    pub following: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserProfileFields {
    account_id: Uuid,
    username: String,
    email: String,
    avatar: String,
    #[serde(default)]
    followers: Vec<Uuid>,
    #[serde(default, rename = "follow")]
    following: Vec<Uuid>,
}

impl UserProfile {
    pub fn from_document(doc: Document) -> Result<Self> {
        let fields: UserProfileFields = serde_json::from_value(doc.fields)?;
        Ok(Self {
            id: doc.id,
            account_id: fields.account_id,
            username: fields.username,
            email: fields.email,
            avatar: fields.avatar,
            followers: fields.followers,
            following: fields.following,
            created_at: doc.created_at,
        })
    }
}

/// Post entity - one uploaded video with its thumbnail
///
/// `creator` is immutable after creation. Exactly one post references
/// exactly one video file and one thumbnail file; both are reclaimed when
/// the post is deleted and the replaced one when it is edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub prompt: String,
    /// Video file id
    pub video: String,
    /// Thumbnail file id
    pub thumbnail: String,
    /// Owning profile id
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PostFields {
    title: String,
    prompt: String,
    video: String,
    thumbnail: String,
    creator: Uuid,
}

impl Post {
    pub fn from_document(doc: Document) -> Result<Self> {
        let fields: PostFields = serde_json::from_value(doc.fields)?;
        Ok(Self {
            id: doc.id,
            title: fields.title,
            prompt: fields.prompt,
            video: fields.video,
            thumbnail: fields.thumbnail,
            creator: fields.creator,
            created_at: doc.created_at,
        })
    }
}

/// Like edge - the authoritative record that a user liked a post
///
/// Stored in its own collection and queried from either side; the service
/// never creates a second edge for the same (user, post) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeEdge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LikeEdgeFields {
    user_id: Uuid,
    post_id: Uuid,
}

impl LikeEdge {
    pub fn from_document(doc: Document) -> Result<Self> {
        let fields: LikeEdgeFields = serde_json::from_value(doc.fields)?;
        Ok(Self {
            id: doc.id,
            user_id: fields.user_id,
            post_id: fields.post_id,
            created_at: doc.created_at,
        })
    }

    pub fn fields(user_id: Uuid, post_id: Uuid) -> Value {
        serde_json::json!({
            "user_id": user_id,
            "post_id": post_id,
        })
    }
}

/// A media asset reference, resolved once at the service boundary
///
/// `Local` carries bytes picked on the device that still need uploading;
/// `Remote` names a file id already held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Local(MediaUpload),
    Remote(String),
}

/// A locally picked asset awaiting upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Media kind, selecting view versus resized-preview URL generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}
