//! In-memory provider, useful for tests and small fixed data sets.

use crate::matching;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use workmatch_core::{CandidateProvider, CandidateRecord, FieldQuery, ProviderError};

pub struct InMemoryCandidates {
    records: Arc<RwLock<Vec<CandidateRecord>>>,
}

impl InMemoryCandidates {
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    pub fn from_records(records: Vec<CandidateRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn insert(&self, record: CandidateRecord) {
        self.records.write().await.push(record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryCandidates {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandidateProvider for InMemoryCandidates {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn query_by_fields(&self, query: &FieldQuery) -> Result<Vec<CandidateRecord>, ProviderError> {
        let records = self.records.read().await;
        Ok(matching::select_by_fields(&records, query))
    }

    async fn query_by_item_id(
        &self,
        item_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        let records = self.records.read().await;
        Ok(matching::select_by_item_id(&records, item_id, limit))
    }
}
