use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Malformed data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Rating must be between 1 and 5 stars, got {0}")]
    InvalidRating(u8),

    #[error("Reordered favorites must contain exactly the current recipes: {0}")]
    InvalidPermutation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
