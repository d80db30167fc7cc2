/// Error types for the client core
use thiserror::Error;

/// Result type alias for client-core operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Application error types
///
/// Every service operation either completes or fails with one of these;
/// no failure is silently downgraded. Messages are human-readable and
/// surfaced to the UI shell as-is.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Referenced user, post, or file is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Actor is not the owner of the resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Relationship or like already exists
    #[error("already exists: {0}")]
    Duplicate(String),

    /// Required field missing or malformed input
    #[error("invalid input: {0}")]
    Validation(String),

    /// Underlying store call failed (network, auth expiry, quota)
    #[error("store request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Transport(format!("document decode failed: {err}"))
    }
}
