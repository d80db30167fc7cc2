pub mod models;

pub use models::{Account, LikeEdge, MediaKind, MediaRef, MediaUpload, Post, UserProfile};
