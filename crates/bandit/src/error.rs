//! Error types for bandit state access.

/// Errors raised by a [`BanditStore`](crate::BanditStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend cannot be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by [`ChannelBandit`](crate::ChannelBandit) operations.
#[derive(Debug, thiserror::Error)]
pub enum BanditError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for bandit operations.
pub type Result<T> = std::result::Result<T, BanditError>;
