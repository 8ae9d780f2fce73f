//! Content source errors

use thiserror::Error;

/// Failure talking to the content source
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content source is not configured: {0}")]
    NotConfigured(String),

    #[error("request to content source failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content source returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode content source response: {0}")]
    Decode(#[from] serde_json::Error),
}
