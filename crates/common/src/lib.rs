//! PaperHub Common Library
//!
//! Shared code for the PaperHub gateway and ingestion tooling including:
//! - Database models and repository patterns
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Authorship matching and citation formatting
//! - Metrics and observability

pub mod auth;
pub mod authorship;
pub mod citation;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod observability;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
