//! Historical work records and the queries that fetch them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical work record as returned by the candidate store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(alias = "itemno")]
    pub item_id: String,

    pub process: String,

    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,

    #[serde(alias = "equipType")]
    pub equipment_type: String,

    #[serde(alias = "statusCode")]
    pub status_code: String,

    #[serde(default)]
    pub priority: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_details: Option<String>,

    /// When the work was recorded; newer records win score ties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// A record with its similarity to the current query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub record: CandidateRecord,

    /// Similarity in `[0, 1]`.
    pub score: f32,
}

/// Field filters passed to [`CandidateProvider::query_by_fields`](crate::CandidateProvider::query_by_fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    /// Maximum number of rows to return
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for FieldQuery {
    fn default() -> Self {
        Self {
            equipment_type: None,
            location: None,
            status_code: None,
            priority: None,
            limit: default_limit(),
        }
    }
}

impl FieldQuery {
    /// True when no filter is set; such a query is not worth sending.
    pub fn is_empty(&self) -> bool {
        self.equipment_type.is_none()
            && self.location.is_none()
            && self.status_code.is_none()
            && self.priority.is_none()
    }
}
