//! Session domain types and the status state machine.

use crate::clues::{AccumulatedClues, ExtractedFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for an intake conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a conversation is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Still gathering location, equipment type and status code.
    #[default]
    CollectingInfo,
    /// All required slots are filled.
    Recommending,
    /// An item id is known.
    Finalizing,
    /// Closed by an explicit finalize action. Terminal.
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::CollectingInfo => "collecting_info",
            SessionStatus::Recommending => "recommending",
            SessionStatus::Finalizing => "finalizing",
            SessionStatus::Completed => "completed",
        }
    }

    /// Whether a ranking call makes sense in this state.
    pub fn permits_ranking(self) -> bool {
        matches!(self, SessionStatus::Recommending | SessionStatus::Finalizing)
    }

    pub fn is_terminal(self) -> bool {
        self == SessionStatus::Completed
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the status after a merge.
///
/// Rules, first match wins:
/// 1. an item id on either side ⇒ `Finalizing`
/// 2. all required slots filled ⇒ `Recommending`
/// 3. otherwise ⇒ `CollectingInfo`
///
/// `Completed` is never derived; only the finalize action sets it.
pub fn derive_status(clues: &AccumulatedClues, incoming: &ExtractedFields) -> SessionStatus {
    if incoming.item_id_value().is_some() || clues.item_id().is_some() {
        SessionStatus::Finalizing
    } else if clues.has_sufficient_info() {
        SessionStatus::Recommending
    } else {
        SessionStatus::CollectingInfo
    }
}

/// A snapshot of one conversation's state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub id: SessionId,
    pub clues: AccumulatedClues,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    /// Incremented once per successful merge.
    pub turn_count: u32,
}

impl SessionState {
    /// A fresh session with empty clues.
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            clues: AccumulatedClues::new(),
            status: SessionStatus::CollectingInfo,
            created_at: now,
            last_updated_at: now,
            turn_count: 0,
        }
    }

    /// Time since the last update, as of `now`.
    pub fn idle_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_updated_at
    }
}
