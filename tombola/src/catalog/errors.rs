//! Feed error types.

use thiserror::Error;

/// Errors raised while loading a catalog or sponsor feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// Source could not be read
    #[error("Feed unavailable: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid JSON
    #[error("Feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Document is JSON but does not have the expected shape
    #[error("Malformed feed: {0}")]
    Malformed(String),

    /// Document parsed but contained no usable item
    #[error("Feed contains no valid {0}")]
    Empty(&'static str),

    /// Source-specific failure (network hosts, custom loaders)
    #[error("Feed source failed: {0}")]
    Source(String),
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
