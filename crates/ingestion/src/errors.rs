//! Ingestion tooling error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl IngestionError {
    /// Worth retrying: network failures, throttling and server errors
    pub fn is_transient(&self) -> bool {
        match self {
            IngestionError::Http { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            IngestionError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<paperhub_common::errors::AppError> for IngestionError {
    fn from(e: paperhub_common::errors::AppError) -> Self {
        IngestionError::DatabaseError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestionError>;
