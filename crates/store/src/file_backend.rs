//! File-backed provider: one JSON `CandidateRecord` per line.
//!
//! The file is read once on open and never written.

use crate::matching;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use workmatch_core::{CandidateProvider, CandidateRecord, FieldQuery, ProviderError};

pub struct JsonlCandidates {
    records: Vec<CandidateRecord>,
}

impl JsonlCandidates {
    /// Open `path`. A missing file is an empty data set.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let path = path.into();
        let records = Self::load_from_disk(&path)?;
        debug!(path = %path.display(), count = records.len(), "Work history loaded");
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn load_from_disk(path: &Path) -> Result<Vec<CandidateRecord>, ProviderError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ProviderError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match serde_json::from_str::<CandidateRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(line = n + 1, error = %e, "Skipping corrupted work record");
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl CandidateProvider for JsonlCandidates {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn query_by_fields(&self, query: &FieldQuery) -> Result<Vec<CandidateRecord>, ProviderError> {
        Ok(matching::select_by_fields(&self.records, query))
    }

    async fn query_by_item_id(
        &self,
        item_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        Ok(matching::select_by_item_id(&self.records, item_id, limit))
    }
}
