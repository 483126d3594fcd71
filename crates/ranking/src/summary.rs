//! Aggregate views over a recommendation list.

use serde::Serialize;
use std::collections::BTreeMap;
use workmatch_core::ScoredCandidate;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingSummary {
    pub total_count: usize,
    /// Rounded to three decimals.
    pub average_score: f32,
    pub top_score: f32,
    pub lowest_score: f32,
    pub priority_distribution: BTreeMap<String, usize>,
    pub equipment_type_distribution: BTreeMap<String, usize>,
}

impl RankingSummary {
    /// All-zero for an empty list.
    pub fn from_candidates(candidates: &[ScoredCandidate]) -> Self {
        if candidates.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_count: candidates.len(),
            top_score: f32::MIN,
            lowest_score: f32::MAX,
            ..Self::default()
        };
        let mut total = 0.0_f32;

        for candidate in candidates {
            total += candidate.score;
            summary.top_score = summary.top_score.max(candidate.score);
            summary.lowest_score = summary.lowest_score.min(candidate.score);
            *summary
                .priority_distribution
                .entry(candidate.record.priority.clone())
                .or_default() += 1;
            *summary
                .equipment_type_distribution
                .entry(candidate.record.equipment_type.clone())
                .or_default() += 1;
        }

        let average = total / candidates.len() as f32;
        summary.average_score = (average * 1000.0).round() / 1000.0;
        summary
    }
}

/// Candidates whose priority equals `priority`, order preserved.
pub fn filter_by_priority(candidates: &[ScoredCandidate], priority: &str) -> Vec<ScoredCandidate> {
    let wanted = priority.trim();
    candidates
        .iter()
        .filter(|c| c.record.priority.trim() == wanted)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use workmatch_core::CandidateRecord;

    fn scored(item_id: &str, equipment: &str, priority: &str, score: f32) -> ScoredCandidate {
        ScoredCandidate {
            record: CandidateRecord {
                item_id: item_id.into(),
                process: "No.1 PE".into(),
                location: "No.1 PE".into(),
                cost_center: None,
                equipment_type: equipment.into(),
                status_code: "고장".into(),
                priority: priority.into(),
                work_title: None,
                work_details: None,
                recorded_at: None,
            },
            score,
        }
    }

    fn sample() -> Vec<ScoredCandidate> {
        vec![
            scored("A", "Pressure Vessel", "긴급작업", 0.95),
            scored("B", "Pressure Vessel", "일반작업", 0.8),
            scored("C", "Pump", "긴급작업", 0.4),
        ]
    }

    #[test]
    fn summary_counts_and_scores() {
        let summary = RankingSummary::from_candidates(&sample());
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.top_score, 0.95);
        assert_eq!(summary.lowest_score, 0.4);
        assert!((summary.average_score - 0.717).abs() < 1e-6);
        assert_eq!(summary.priority_distribution["긴급작업"], 2);
        assert_eq!(summary.equipment_type_distribution["Pump"], 1);
    }

    #[test]
    fn empty_summary() {
        let summary = RankingSummary::from_candidates(&[]);
        assert_eq!(summary, RankingSummary::default());
    }

    #[test]
    fn filter_keeps_order() {
        let urgent = filter_by_priority(&sample(), "긴급작업");
        let ids: Vec<&str> = urgent.iter().map(|c| c.record.item_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert!(filter_by_priority(&sample(), "계획작업").is_empty());
    }
}
