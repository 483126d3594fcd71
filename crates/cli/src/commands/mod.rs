pub mod classify;
pub mod onboard;
pub mod rank;
pub mod replay;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;
use workmatch_config::AppConfig;
use workmatch_core::CandidateProvider;
use workmatch_store::JsonlCandidates;

/// Load the configuration, turning errors into a printable message.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The configured provider, or a JSONL file given on the command line.
pub async fn provider(
    config: &AppConfig,
    records: Option<PathBuf>,
) -> Result<Arc<dyn CandidateProvider>, Box<dyn std::error::Error>> {
    let provider: Arc<dyn CandidateProvider> = match records {
        Some(path) => Arc::new(JsonlCandidates::open(path)?),
        None => workmatch_store::open_provider(&config.store).await?,
    };
    Ok(provider)
}
