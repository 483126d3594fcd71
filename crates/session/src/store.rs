//! Keyed session store with per-session locking and TTL expiry.
//!
//! The map is guarded by an `RwLock` that is only held long enough to look
//! up, insert, or remove an entry. Each session sits behind its own `Mutex`,
//! so turns on different sessions never wait on each other while turns on
//! the same session are serialized.
//!
//! Lock order: an entry mutex is never held while acquiring the map lock
//! for writing, and the map lock is never held while locking an entry.
//! The clock is read only while the entry mutex is held, so turns on one
//! session see non-decreasing times and an expired or completed-past-grace
//! state is never mutated again. The identity-checked removal in
//! [`SessionStore::remove_if_same`] relies on that.

use crate::clock::{Clock, SystemClock};
use chrono::Duration;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};
use workmatch_config::{AppConfig, SessionConfig};
use workmatch_core::{
    derive_status, ClueMerger, ExtractedFields, SessionId, SessionState, SessionStatus,
};

type Slot = Arc<Mutex<SessionState>>;

/// Expiry windows.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Idle time after which a session is gone.
    pub ttl: Duration,
    /// How long a completed session is kept before cleanup removes it.
    pub completed_grace: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(30),
            completed_grace: Duration::minutes(5),
        }
    }
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            ttl: minutes(config.ttl_minutes),
            completed_grace: minutes(config.completed_grace_minutes),
        }
    }
}

fn minutes(value: u64) -> Duration {
    Duration::minutes(value.min(i32::MAX as u64) as i64)
}

/// Aggregate view for monitoring.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub status_breakdown: BTreeMap<String, usize>,
    pub avg_turn_count: f64,
}

/// The only owner of conversation state.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Slot>>,
    settings: SessionSettings,
    merger: ClueMerger,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(settings: SessionSettings, merger: ClueMerger) -> Self {
        Self::with_clock(settings, merger, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: SessionSettings, merger: ClueMerger, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            settings,
            merger,
            clock,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            SessionSettings::from(&config.session),
            ClueMerger::new(
                config.merge.confidence_margin,
                config.merge.priority_placeholder.clone(),
            ),
        )
    }

    /// Start a new conversation with empty clues.
    pub fn create(&self) -> SessionId {
        let id = SessionId::new();
        let state = SessionState::new(id.clone(), self.clock.now());
        self.write_map().insert(id.clone(), Arc::new(Mutex::new(state)));
        info!(session_id = %id, "Session created");
        id
    }

    /// Snapshot of a live session. Expired sessions are evicted and reported as absent.
    pub fn get(&self, id: &SessionId) -> Option<SessionState> {
        let slot = self.slot(id)?;
        let state = lock(&slot);
        if self.is_expired(&state, self.clock.now()) {
            drop(state);
            if self.remove_if_same(id, &slot) {
                info!(session_id = %id, "Session expired");
            }
            return None;
        }
        Some(state.clone())
    }

    /// Fold one turn's extraction into the session.
    ///
    /// Unknown or expired ids get a fresh session under the same id, so this
    /// never fails. A completed session is returned unchanged.
    pub fn update(&self, id: &SessionId, extracted: &ExtractedFields) -> SessionState {
        let stale = match self.slot(id) {
            Some(slot) => {
                let mut state = lock(&slot);
                let now = self.clock.now();
                if !self.is_expired(&state, now) {
                    return self.apply(&mut state, extracted, now);
                }
                drop(state);
                Some(slot)
            }
            None => None,
        };

        let slot = self.fresh_slot(id, stale.as_ref());
        let mut state = lock(&slot);
        let now = self.clock.now();
        self.apply(&mut state, extracted, now)
    }

    /// Mark a live session as completed. Returns `false` for unknown or expired ids.
    pub fn finalize(&self, id: &SessionId) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        let mut state = lock(&slot);
        let now = self.clock.now();
        if self.is_expired(&state, now) {
            return false;
        }
        if !state.status.is_terminal() {
            state.status = SessionStatus::Completed;
            state.last_updated_at = now;
            info!(session_id = %id, turns = state.turn_count, "Session completed");
        }
        true
    }

    pub fn delete(&self, id: &SessionId) -> bool {
        let removed = self.write_map().remove(id).is_some();
        if removed {
            info!(session_id = %id, "Session deleted");
        }
        removed
    }

    /// Remove expired sessions and sessions completed longer than the grace period ago.
    ///
    /// Entries are examined one at a time, so foreground calls only ever wait
    /// for a single removal.
    pub fn cleanup_expired(&self) -> usize {
        let snapshot: Vec<(SessionId, Slot)> = self
            .read_map()
            .iter()
            .map(|(id, slot)| (id.clone(), slot.clone()))
            .collect();

        let mut removed = 0;
        for (id, slot) in snapshot {
            let evict = {
                let state = lock(&slot);
                let now = self.clock.now();
                self.is_expired(&state, now) || self.is_completed_past_grace(&state, now)
            };
            if evict && self.remove_if_same(&id, &slot) {
                debug!(session_id = %id, "Evicted session");
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, "Expired sessions cleaned up");
        }
        removed
    }

    pub fn stats(&self) -> SessionStats {
        let slots: Vec<Slot> = self.read_map().values().cloned().collect();
        if slots.is_empty() {
            return SessionStats::default();
        }

        let mut stats = SessionStats {
            total_sessions: slots.len(),
            ..SessionStats::default()
        };
        let mut total_turns: u64 = 0;
        for slot in &slots {
            let state = lock(slot);
            *stats
                .status_breakdown
                .entry(state.status.as_str().to_string())
                .or_insert(0) += 1;
            total_turns += u64::from(state.turn_count);
        }
        stats.avg_turn_count = total_turns as f64 / slots.len() as f64;
        stats
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(
        &self,
        state: &mut SessionState,
        extracted: &ExtractedFields,
        now: chrono::DateTime<chrono::Utc>,
    ) -> SessionState {
        if state.status.is_terminal() {
            warn!(session_id = %state.id, "Ignoring turn for completed session");
            return state.clone();
        }

        debug!(
            session_id = %state.id,
            before = ?state.clues,
            incoming = ?extracted,
            "Merging clues"
        );

        let merged = self.merger.merge(&state.clues, extracted);
        let status = derive_status(&merged, extracted);

        state.clues = merged;
        state.status = status;
        state.turn_count += 1;
        state.last_updated_at = now;

        info!(
            session_id = %state.id,
            status = %status,
            turn = state.turn_count,
            "Session updated"
        );
        state.clone()
    }

    /// Slot to write a turn into once the existing one (if any) turned out stale.
    fn fresh_slot(&self, id: &SessionId, stale: Option<&Slot>) -> Slot {
        let mut map = self.write_map();
        if let Some(current) = map.get(id) {
            let is_stale = stale.is_some_and(|s| Arc::ptr_eq(s, current));
            if !is_stale {
                // Another turn re-created it between our read and this write.
                return current.clone();
            }
        }

        info!(session_id = %id, "Session missing or expired, starting a new one");
        let slot = Arc::new(Mutex::new(SessionState::new(id.clone(), self.clock.now())));
        map.insert(id.clone(), slot.clone());
        slot
    }

    fn is_expired(&self, state: &SessionState, now: chrono::DateTime<chrono::Utc>) -> bool {
        state.idle_for(now) > self.settings.ttl
    }

    fn is_completed_past_grace(
        &self,
        state: &SessionState,
        now: chrono::DateTime<chrono::Utc>,
    ) -> bool {
        state.status.is_terminal() && state.idle_for(now) > self.settings.completed_grace
    }

    fn slot(&self, id: &SessionId) -> Option<Slot> {
        self.read_map().get(id).cloned()
    }

    /// Remove `id` only if it still maps to `slot`.
    fn remove_if_same(&self, id: &SessionId, slot: &Slot) -> bool {
        let mut map = self.write_map();
        match map.get(id) {
            Some(current) if Arc::ptr_eq(current, slot) => {
                map.remove(id);
                true
            }
            _ => false,
        }
    }

    fn read_map(&self) -> RwLockReadGuard<'_, HashMap<SessionId, Slot>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, Slot>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionSettings::default(), ClueMerger::default())
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, SessionState> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
