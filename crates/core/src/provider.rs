//! Candidate provider trait: the record store that yields rows for a query.
//!
//! Implementations live in `workmatch-store`: in-memory, JSONL file, SQLite.

use crate::error::ProviderError;
use crate::record::{CandidateRecord, FieldQuery};
use async_trait::async_trait;

#[async_trait]
pub trait CandidateProvider: Send + Sync {
    /// The backend name (e.g., "sqlite", "jsonl", "in_memory").
    fn name(&self) -> &str;

    /// Records matching the given descriptive fields.
    async fn query_by_fields(
        &self,
        query: &FieldQuery,
    ) -> std::result::Result<Vec<CandidateRecord>, ProviderError>;

    /// Records whose item id matches `item_id`.
    async fn query_by_item_id(
        &self,
        item_id: &str,
        limit: usize,
    ) -> std::result::Result<Vec<CandidateRecord>, ProviderError>;
}
