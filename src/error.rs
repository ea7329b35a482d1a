//! Error types for blame retrieval and resource identifiers.
//!
//! `BlameError` is `Clone` because a single failed computation is shared by
//! every caller awaiting the same cache entry.
//!
//! Variants:
//! - `Source`: the raw blame provider failed for a file
//! - `InvalidResource`: a resource identifier could not be decoded
//! - `Serialization`: a resource query could not be encoded

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlameError {
    #[error("Blame source failed for {file}: {message}")]
    Source { file: String, message: String },

    #[error("Invalid resource identifier: {0}")]
    InvalidResource(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BlameError {
    /// Wrap a provider failure, keeping the full context chain as text.
    pub fn from_source(file: &str, err: &anyhow::Error) -> Self {
        BlameError::Source {
            file: file.to_string(),
            message: format!("{:#}", err),
        }
    }
}

impl From<serde_json::Error> for BlameError {
    fn from(err: serde_json::Error) -> Self {
        BlameError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BlameError>;
