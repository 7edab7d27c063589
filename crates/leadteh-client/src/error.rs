//! Leadteh client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadtehError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),

    #[error("Webhook rejected the request with status {status}")]
    Webhook {
        status: u16,
        body: serde_json::Value,
    },
}
