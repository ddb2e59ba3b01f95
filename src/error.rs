use thiserror::Error;

use crate::cache::CacheError;

/// Failures that reach the caller of the suggestion pipeline. Fetch and
/// ranking problems never appear here; they degrade in place.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// Malformed location key or empty family profile. Rejected before any
    /// I/O; the web layer maps this to a 4xx response.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The cache backend is down. Fatal for the request, since without it
    /// every call would re-fetch; maps to a 5xx response.
    #[error("cache unavailable: {0}")]
    Cache(#[from] CacheError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T, E = SuggestError> = std::result::Result<T, E>;
