//! Background eviction loop.

use crate::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Run [`SessionStore::cleanup_expired`] every `interval` until the handle is aborted.
///
/// The first sweep happens immediately.
pub fn spawn_sweeper(store: Arc<SessionStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "Session sweeper started");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = store.cleanup_expired();
            debug!(removed, remaining = store.len(), "Sweep finished");
        }
    })
}
