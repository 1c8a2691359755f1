//! Announcer error types.

use thiserror::Error;

/// Errors raised while speaking an announcement
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// No speech backend available on this host
    #[error("Speech synthesis is not supported")]
    Unsupported,

    /// Speaking was interrupted by a cancel request
    #[error("Announcement cancelled")]
    Cancelled,

    /// Backend failed while speaking
    #[error("Speech synthesis failed: {0}")]
    Failed(String),
}

/// Result type for announcer operations
pub type AnnounceResult<T> = Result<T, AnnounceError>;
