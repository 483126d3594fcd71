//! Error types for the workmatch collaborators.
//!
//! Each external collaborator has its own error enum. The core operations
//! themselves are total: these errors only surface at the edges (store
//! construction, extractor calls).

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Candidate store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Extraction request failed: {0}")]
    RequestFailed(String),

    #[error("Extractor not configured: {0}")]
    NotConfigured(String),
}
