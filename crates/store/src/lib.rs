//! Candidate providers: where historical work records come from.

pub mod file_backend;
pub mod in_memory;
pub mod matching;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file_backend::JsonlCandidates;
pub use in_memory::InMemoryCandidates;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCandidates;

use std::sync::Arc;
use tracing::info;
use workmatch_config::StoreConfig;
use workmatch_core::{CandidateProvider, ProviderError};

/// Open the provider named by `config.backend`.
pub async fn open_provider(config: &StoreConfig) -> Result<Arc<dyn CandidateProvider>, ProviderError> {
    let provider: Arc<dyn CandidateProvider> = match config.backend.as_str() {
        "memory" => Arc::new(InMemoryCandidates::new()),
        "jsonl" => Arc::new(JsonlCandidates::open(config.resolved_path())?),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config.resolved_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ProviderError::Storage(format!("Failed to create database directory: {e}"))
                })?;
            }
            let url = format!("sqlite://{}", path.display());
            Arc::new(SqliteCandidates::open(&url).await?)
        }
        other => {
            return Err(ProviderError::Unavailable(format!(
                "Unknown or disabled store backend: {other}"
            )));
        }
    };

    info!(backend = provider.name(), "Candidate provider ready");
    Ok(provider)
}
