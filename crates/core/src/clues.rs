//! Slot-filling clues: per-turn extractions and their accumulation.
//!
//! An external extractor turns each utterance into [`ExtractedFields`] with a
//! single confidence. The session keeps an [`AccumulatedClues`] record with
//! one confidence per slot, and [`ClueMerger`] is the only way to fold a new
//! extraction into it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A new extraction must beat the stored confidence by more than this to
/// replace an already-filled slot.
pub const DEFAULT_CONFIDENCE_MARGIN: f32 = 0.1;

/// The extractor's neutral priority ("normal work"). Never counts as a stated priority.
pub const DEFAULT_PRIORITY_PLACEHOLDER: &str = "일반작업";

// ── Confidence ────────────────────────────────────────────────────────────

/// A confidence scalar, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Confidence(f32);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);

    /// Clamp into `[0, 1]`. NaN becomes `0.0`.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<f32> for Confidence {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(confidence: Confidence) -> f32 {
        confidence.0
    }
}

// ── Fields ────────────────────────────────────────────────────────────────

/// The confidence-tracked slots of a work request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueField {
    Location,
    EquipmentType,
    StatusCode,
    Priority,
}

impl ClueField {
    /// Slots that must all be filled before recommending.
    pub const REQUIRED: [ClueField; 3] = [
        ClueField::Location,
        ClueField::EquipmentType,
        ClueField::StatusCode,
    ];

    pub const ALL: [ClueField; 4] = [
        ClueField::Location,
        ClueField::EquipmentType,
        ClueField::StatusCode,
        ClueField::Priority,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClueField::Location => "location",
            ClueField::EquipmentType => "equipment_type",
            ClueField::StatusCode => "status_code",
            ClueField::Priority => "priority",
        }
    }
}

impl fmt::Display for ClueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Per-turn extraction ───────────────────────────────────────────────────

/// Fields extracted from one utterance by the external extractor.
///
/// Absent, empty, and whitespace-only values all mean "not stated".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, alias = "equipType", skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,

    #[serde(default, alias = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(default, alias = "itemno", alias = "itemId", skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    /// Scalar confidence for the whole extraction.
    #[serde(default)]
    pub confidence: Confidence,
}

impl ExtractedFields {
    /// An extraction that states nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_confidence(confidence: f32) -> Self {
        Self {
            confidence: Confidence::new(confidence),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn with_equipment_type(mut self, value: impl Into<String>) -> Self {
        self.equipment_type = Some(value.into());
        self
    }

    pub fn with_status_code(mut self, value: impl Into<String>) -> Self {
        self.status_code = Some(value.into());
        self
    }

    pub fn with_priority(mut self, value: impl Into<String>) -> Self {
        self.priority = Some(value.into());
        self
    }

    pub fn with_item_id(mut self, value: impl Into<String>) -> Self {
        self.item_id = Some(value.into());
        self
    }

    /// The trimmed value of a slot, if one was actually stated.
    pub fn field(&self, field: ClueField) -> Option<&str> {
        let raw = match field {
            ClueField::Location => &self.location,
            ClueField::EquipmentType => &self.equipment_type,
            ClueField::StatusCode => &self.status_code,
            ClueField::Priority => &self.priority,
        };
        present(raw)
    }

    pub fn item_id_value(&self) -> Option<&str> {
        present(&self.item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.item_id_value().is_none() && ClueField::ALL.iter().all(|f| self.field(*f).is_none())
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ── Accumulated state ─────────────────────────────────────────────────────

/// A filled slot and the confidence it was accepted with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clue {
    value: String,
    confidence: Confidence,
}

impl Clue {
    fn new(value: &str, confidence: Confidence) -> Self {
        Self {
            value: value.to_string(),
            confidence,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn confidence(&self) -> f32 {
        self.confidence.value()
    }
}

/// The session-scoped, partially filled work request.
///
/// Only [`ClueMerger::merge`] produces non-empty instances; an empty slot
/// reports confidence `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccumulatedClues {
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Clue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    equipment_type: Option<Clue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<Clue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Clue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,
}

impl AccumulatedClues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clue(&self, field: ClueField) -> Option<&Clue> {
        match field {
            ClueField::Location => self.location.as_ref(),
            ClueField::EquipmentType => self.equipment_type.as_ref(),
            ClueField::StatusCode => self.status_code.as_ref(),
            ClueField::Priority => self.priority.as_ref(),
        }
    }

    pub fn value(&self, field: ClueField) -> Option<&str> {
        self.clue(field).map(Clue::value)
    }

    pub fn confidence(&self, field: ClueField) -> f32 {
        self.clue(field).map_or(0.0, Clue::confidence)
    }

    pub fn location(&self) -> Option<&str> {
        self.value(ClueField::Location)
    }

    pub fn equipment_type(&self) -> Option<&str> {
        self.value(ClueField::EquipmentType)
    }

    pub fn status_code(&self) -> Option<&str> {
        self.value(ClueField::StatusCode)
    }

    pub fn priority(&self) -> Option<&str> {
        self.value(ClueField::Priority)
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    /// Required slots that are still empty, in asking order.
    pub fn missing_fields(&self) -> Vec<ClueField> {
        ClueField::REQUIRED
            .into_iter()
            .filter(|field| self.clue(*field).is_none())
            .collect()
    }

    pub fn has_sufficient_info(&self) -> bool {
        ClueField::REQUIRED.iter().all(|f| self.clue(*f).is_some())
    }

    /// Mean confidence over the filled slots, `0.0` when nothing is filled.
    pub fn overall_confidence(&self) -> f32 {
        let filled: Vec<f32> = ClueField::ALL
            .iter()
            .filter_map(|f| self.clue(*f))
            .map(Clue::confidence)
            .filter(|c| *c > 0.0)
            .collect();
        if filled.is_empty() {
            0.0
        } else {
            filled.iter().sum::<f32>() / filled.len() as f32
        }
    }

    fn slot_mut(&mut self, field: ClueField) -> &mut Option<Clue> {
        match field {
            ClueField::Location => &mut self.location,
            ClueField::EquipmentType => &mut self.equipment_type,
            ClueField::StatusCode => &mut self.status_code,
            ClueField::Priority => &mut self.priority,
        }
    }
}

// ── Merging ───────────────────────────────────────────────────────────────

/// Folds per-turn extractions into accumulated clues.
///
/// A stated slot overwrites the stored one when the stored slot is empty or
/// the new confidence exceeds the stored confidence by more than `margin`.
/// Priority additionally ignores the placeholder value. Item ids always
/// overwrite.
#[derive(Debug, Clone)]
pub struct ClueMerger {
    margin: f32,
    priority_placeholder: String,
}

impl Default for ClueMerger {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_MARGIN, DEFAULT_PRIORITY_PLACEHOLDER)
    }
}

impl ClueMerger {
    pub fn new(margin: f32, priority_placeholder: impl Into<String>) -> Self {
        Self {
            margin: margin.max(0.0),
            priority_placeholder: priority_placeholder.into(),
        }
    }

    /// Merge `incoming` into a copy of `existing`. Neither input is modified.
    pub fn merge(&self, existing: &AccumulatedClues, incoming: &ExtractedFields) -> AccumulatedClues {
        let mut merged = existing.clone();
        let confidence = incoming.confidence;

        for field in ClueField::ALL {
            let Some(value) = incoming.field(field) else {
                continue;
            };
            if field == ClueField::Priority && value == self.priority_placeholder {
                continue;
            }

            let slot = merged.slot_mut(field);
            let accept = match slot.as_ref() {
                None => true,
                Some(current) => confidence.value() > current.confidence() + self.margin,
            };
            if accept {
                *slot = Some(Clue::new(value, confidence));
            }
        }

        if let Some(item_id) = incoming.item_id_value() {
            merged.item_id = Some(item_id.to_string());
        }

        merged
    }
}
