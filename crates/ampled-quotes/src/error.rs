//! Error types for ampled-quotes

use thiserror::Error;

/// Quote fetch failure
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Transport failure or non-success status
    #[error("quote request failed: {0}")]
    Network(String),

    /// Response could not be decoded
    #[error("malformed quote response: {0}")]
    Malformed(String),

    /// Decoded quote has no text
    #[error("quote service returned an empty quote")]
    Empty,

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for QuoteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, QuoteError>;
