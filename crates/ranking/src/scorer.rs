//! Weighted fuzzy scoring of a query against one candidate record.

use crate::similarity::similarity;
use serde::{Deserialize, Serialize};
use tracing::trace;
use workmatch_config::RankingConfig;
use workmatch_core::{AccumulatedClues, CandidateRecord, FieldQuery, Scenario};

/// A field that can take part in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    ItemId,
    Location,
    EquipmentType,
    StatusCode,
    Priority,
}

impl MatchField {
    fn of_record(self, record: &CandidateRecord) -> &str {
        match self {
            MatchField::ItemId => &record.item_id,
            MatchField::Location => &record.location,
            MatchField::EquipmentType => &record.equipment_type,
            MatchField::StatusCode => &record.status_code,
            MatchField::Priority => &record.priority,
        }
    }
}

const DESCRIPTIVE_WEIGHTS: &[(MatchField, f32)] = &[
    (MatchField::EquipmentType, 0.35),
    (MatchField::Location, 0.35),
    (MatchField::StatusCode, 0.20),
    (MatchField::Priority, 0.10),
];

const IDENTIFIER_WEIGHTS: &[(MatchField, f32)] = &[
    (MatchField::ItemId, 0.70),
    (MatchField::StatusCode, 0.20),
    (MatchField::Priority, 0.10),
];

/// Field weights for one scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightTable {
    weights: &'static [(MatchField, f32)],
}

impl WeightTable {
    pub fn for_scenario(scenario: Scenario) -> Self {
        let weights = match scenario {
            Scenario::Descriptive => DESCRIPTIVE_WEIGHTS,
            Scenario::Identifier => IDENTIFIER_WEIGHTS,
        };
        Self { weights }
    }

    pub fn weight(&self, field: MatchField) -> Option<f32> {
        self.weights
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MatchField, f32)> + '_ {
        self.weights.iter().copied()
    }
}

/// What the caller is looking for. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl RankQuery {
    pub fn from_clues(clues: &AccumulatedClues) -> Self {
        Self {
            item_id: clues.item_id().map(str::to_string),
            location: clues.location().map(str::to_string),
            equipment_type: clues.equipment_type().map(str::to_string),
            status_code: clues.status_code().map(str::to_string),
            priority: clues.priority().map(str::to_string),
        }
    }

    pub fn value(&self, field: MatchField) -> Option<&str> {
        let raw = match field {
            MatchField::ItemId => &self.item_id,
            MatchField::Location => &self.location,
            MatchField::EquipmentType => &self.equipment_type,
            MatchField::StatusCode => &self.status_code,
            MatchField::Priority => &self.priority,
        };
        raw.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Provider filters for a descriptive lookup.
    pub fn to_field_query(&self, limit: usize) -> FieldQuery {
        FieldQuery {
            equipment_type: self.value(MatchField::EquipmentType).map(str::to_string),
            location: self.value(MatchField::Location).map(str::to_string),
            status_code: self.value(MatchField::StatusCode).map(str::to_string),
            priority: self.value(MatchField::Priority).map(str::to_string),
            limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    bonus: f32,
    bonus_threshold: f32,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self {
            bonus: 0.10,
            bonus_threshold: 0.8,
        }
    }
}

impl SimilarityScorer {
    pub fn new(bonus: f32, bonus_threshold: f32) -> Self {
        Self {
            bonus,
            bonus_threshold,
        }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.completeness_bonus, config.bonus_threshold)
    }

    /// Score in `[0, 1]`.
    ///
    /// Only fields present on both sides carry weight, and the weighted sum is
    /// divided by the weight actually applied. When every applied field
    /// clears the bonus threshold the completeness bonus is added, capped at
    /// `1.0`. No applicable field at all scores `0.0`.
    pub fn score(&self, scenario: Scenario, query: &RankQuery, record: &CandidateRecord) -> f32 {
        let table = WeightTable::for_scenario(scenario);

        let mut weighted = 0.0_f32;
        let mut applied = 0.0_f32;
        let mut all_strong = true;

        for (field, weight) in table.iter() {
            let Some(wanted) = query.value(field) else {
                continue;
            };
            let have = field.of_record(record).trim();
            if have.is_empty() {
                continue;
            }

            let sim = similarity(wanted, have);
            weighted += sim * weight;
            applied += weight;
            all_strong &= sim > self.bonus_threshold;
        }

        if applied <= 0.0 {
            return 0.0;
        }

        let mut score = weighted / applied;
        if all_strong {
            score = (score + self.bonus).min(1.0);
        }

        trace!(item_id = %record.item_id, score, "Scored candidate");
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: &str, equipment: &str, status: &str, priority: &str) -> CandidateRecord {
        CandidateRecord {
            item_id: "PE-V2884".into(),
            process: location.into(),
            location: location.into(),
            cost_center: None,
            equipment_type: equipment.into(),
            status_code: status.into(),
            priority: priority.into(),
            work_title: None,
            work_details: None,
            recorded_at: None,
        }
    }

    fn query(location: &str, equipment: &str, status: &str) -> RankQuery {
        RankQuery {
            location: Some(location.into()),
            equipment_type: Some(equipment.into()),
            status_code: Some(status.into()),
            ..RankQuery::default()
        }
    }

    #[test]
    fn identical_fields_score_at_least_point_nine() {
        let scorer = SimilarityScorer::default();
        let r = record("No.1 PE", "Pressure Vessel", "고장", "긴급작업");
        let q = RankQuery {
            priority: Some("긴급작업".into()),
            ..query("No.1 PE", "Pressure Vessel", "고장")
        };
        let s = scorer.score(Scenario::Descriptive, &q, &r);
        assert!(s >= 0.9);
        assert_eq!(s, 1.0);
    }

    #[test]
    fn unrelated_record_scores_low() {
        let scorer = SimilarityScorer::default();
        let r = record("Utility Block", "Centrifugal Pump", "진동", "일반작업");
        let s = scorer.score(Scenario::Descriptive, &query("No.1 PE", "Pressure Vessel", "고장"), &r);
        assert!(s < 0.3, "{s}");
    }

    #[test]
    fn absent_fields_carry_no_weight() {
        let scorer = SimilarityScorer::default();
        let r = record("No.1 PE", "Pressure Vessel", "고장", "");
        let q = RankQuery {
            location: Some("No.1 PE".into()),
            ..RankQuery::default()
        };
        // Only location is applied; a perfect match plus bonus caps at 1.0.
        assert_eq!(scorer.score(Scenario::Descriptive, &q, &r), 1.0);
    }

    #[test]
    fn strong_but_inexact_fields_earn_the_bonus() {
        let r = record("No.1 PE A", "Pressure Vessel A", "고장", "");
        let q = query("No.1 PE", "Pressure Vessel", "고장");

        let base = SimilarityScorer::new(0.0, 0.8).score(Scenario::Descriptive, &q, &r);
        assert!(base < 0.9, "{base}");
        for (wanted, have) in [("No.1 PE", "No.1 PE A"), ("Pressure Vessel", "Pressure Vessel A")] {
            assert!(similarity(wanted, have) > 0.8);
        }

        let boosted = SimilarityScorer::default().score(Scenario::Descriptive, &q, &r);
        assert!((boosted - (base + 0.10)).abs() < 1e-6, "{base} -> {boosted}");
    }

    #[test]
    fn weights_normalised_by_applied_sum() {
        let scorer = SimilarityScorer::new(0.0, 0.8);
        let r = record("No.1 PE", "Heat Exchanger", "고장", "");
        let q = query("No.1 PE", "Pressure Vessel", "고장");
        let equipment = similarity("Pressure Vessel", "Heat Exchanger");
        let expected = (0.35 * 1.0 + 0.35 * equipment + 0.20 * 1.0) / 0.90;
        assert!((scorer.score(Scenario::Descriptive, &q, &r) - expected).abs() < 1e-5);
    }

    #[test]
    fn bonus_requires_every_applied_field_to_be_strong() {
        let scorer = SimilarityScorer::default();
        let r = record("No.1 PE", "Pressure Vessel", "누설", "");
        let q = query("No.1 PE", "Pressure Vessel", "고장");
        let s = scorer.score(Scenario::Descriptive, &q, &r);
        let status = similarity("고장", "누설");
        let expected = (0.35 + 0.35 + 0.20 * status) / 0.90;
        assert!((s - expected).abs() < 1e-5, "{s} vs {expected}");
    }

    #[test]
    fn identifier_scenario_weights_item_id() {
        let scorer = SimilarityScorer::default();
        let r = record("No.1 PE", "Pressure Vessel", "고장", "");
        let q = RankQuery {
            item_id: Some("PE-V2884".into()),
            location: Some("somewhere else".into()),
            ..RankQuery::default()
        };
        // Location is not in the identifier table, so it cannot drag the score down.
        assert_eq!(scorer.score(Scenario::Identifier, &q, &r), 1.0);
    }

    #[test]
    fn nothing_applicable_scores_zero() {
        let scorer = SimilarityScorer::default();
        let r = record("No.1 PE", "Pressure Vessel", "고장", "");
        assert_eq!(scorer.score(Scenario::Descriptive, &RankQuery::default(), &r), 0.0);
    }

    #[test]
    fn weight_tables() {
        let descriptive = WeightTable::for_scenario(Scenario::Descriptive);
        assert_eq!(descriptive.weight(MatchField::Location), Some(0.35));
        assert_eq!(descriptive.weight(MatchField::ItemId), None);
        let total: f32 = descriptive.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-6);

        let identifier = WeightTable::for_scenario(Scenario::Identifier);
        assert_eq!(identifier.weight(MatchField::ItemId), Some(0.70));
        assert_eq!(identifier.weight(MatchField::EquipmentType), None);
    }

    #[test]
    fn query_from_clues_and_field_query() {
        use workmatch_core::{ClueMerger, ExtractedFields};
        let clues = ClueMerger::default().merge(
            &AccumulatedClues::new(),
            &ExtractedFields::with_confidence(0.9)
                .with_location("No.1 PE")
                .with_status_code("고장"),
        );
        let q = RankQuery::from_clues(&clues);
        assert_eq!(q.location.as_deref(), Some("No.1 PE"));
        assert!(q.equipment_type.is_none());

        let fq = q.to_field_query(30);
        assert_eq!(fq.limit, 30);
        assert_eq!(fq.status_code.as_deref(), Some("고장"));
        assert!(fq.priority.is_none());
    }

    #[test]
    fn blank_query_values_are_absent() {
        let q = RankQuery {
            location: Some("   ".into()),
            ..RankQuery::default()
        };
        assert_eq!(q.value(MatchField::Location), None);
        assert!(q.to_field_query(10).is_empty());
    }
}
