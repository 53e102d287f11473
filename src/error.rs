//! Error handling and custom error types
//!
//! Provides unified error handling across the client using thiserror.
//! Remote-reported failures (`successful: false`) are not errors at the
//! gateway level; [`Error::Remote`] only appears when a caller unwraps an
//! envelope with [`crate::models::ApiResponse::into_data`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error (status {status}): {body}")]
    Transport { status: u16, body: String },

    #[error("Remote service error (status {status_code}): {}", .message.as_deref().unwrap_or("no message"))]
    Remote {
        status_code: i32,
        message: Option<String>,
    },

    #[error("Environment file error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
