//! Provider → scorer → bander orchestration.

use crate::bander::{Band, ResultBander};
use crate::scorer::{MatchField, RankQuery, SimilarityScorer};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};
use workmatch_config::RankingConfig;
use workmatch_core::{
    CandidateProvider, CandidateRecord, ProviderError, Scenario, ScoredCandidate, SessionState,
};

/// One ranking call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankRequest {
    pub scenario: Scenario,
    pub query: RankQuery,
}

impl RankRequest {
    pub fn new(scenario: Scenario, query: RankQuery) -> Self {
        Self { scenario, query }
    }

    /// Build a request from a session's accumulated clues.
    ///
    /// The session's item id decides the scenario; `hint` is the classifier's
    /// verdict for the latest utterance and only matters for logging.
    pub fn for_session(state: &SessionState, hint: Scenario) -> Self {
        let query = RankQuery::from_clues(&state.clues);
        let scenario = if query.value(MatchField::ItemId).is_some() {
            Scenario::Identifier
        } else {
            if hint == Scenario::Identifier {
                debug!(session_id = %state.id, "No item id extracted, ranking descriptively");
            }
            Scenario::Descriptive
        };
        Self { scenario, query }
    }

    /// The scenario that will actually be used. Identifier requests without an item id rank descriptively.
    pub fn effective_scenario(&self) -> Scenario {
        match self.scenario {
            Scenario::Identifier if self.query.value(MatchField::ItemId).is_some() => {
                Scenario::Identifier
            }
            _ => Scenario::Descriptive,
        }
    }
}

/// A banded result plus how many candidates cleared the cutoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    pub candidates: Vec<ScoredCandidate>,
    pub total_matches: usize,
    pub band: Band,
}

impl Ranking {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

pub struct RecommendationRanker {
    provider: Arc<dyn CandidateProvider>,
    scorer: SimilarityScorer,
    bander: ResultBander,
    min_score: f32,
    fetch_limit: usize,
}

impl RecommendationRanker {
    pub fn new(provider: Arc<dyn CandidateProvider>) -> Self {
        Self::from_config(provider, &RankingConfig::default())
    }

    pub fn from_config(provider: Arc<dyn CandidateProvider>, config: &RankingConfig) -> Self {
        Self {
            provider,
            scorer: SimilarityScorer::from_config(config),
            bander: ResultBander::from_config(config),
            min_score: config.min_score,
            fetch_limit: config.fetch_limit,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Banded candidates only.
    pub async fn rank(&self, request: &RankRequest) -> Vec<ScoredCandidate> {
        self.rank_detailed(request).await.candidates
    }

    /// Never fails: an unusable query or a provider error yields an empty ranking.
    pub async fn rank_detailed(&self, request: &RankRequest) -> Ranking {
        let scored = self.matches(request).await;
        self.banded(scored)
    }

    /// Every candidate above the score cutoff, best first, before banding.
    pub async fn matches(&self, request: &RankRequest) -> Vec<ScoredCandidate> {
        let scenario = request.effective_scenario();
        let records = match self.fetch(scenario, &request.query).await {
            Ok(records) => records,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Candidate lookup failed");
                return Vec::new();
            }
        };

        let fetched = records.len();
        let mut scored: Vec<ScoredCandidate> = records
            .into_iter()
            .filter_map(|record| {
                let score = self.scorer.score(scenario, &request.query, &record);
                (score > self.min_score).then_some(ScoredCandidate { record, score })
            })
            .collect();
        scored.sort_by(compare_ranked);

        debug!(scenario = %scenario, fetched, matched = scored.len(), "Candidates scored");
        scored
    }

    /// Band an already sorted candidate list.
    pub fn banded(&self, scored: Vec<ScoredCandidate>) -> Ranking {
        let total_matches = scored.len();
        let band = self.bander.band_of(total_matches);
        let candidates = self.bander.band(scored);

        info!(
            matched = total_matches,
            returned = candidates.len(),
            band = %band,
            "Ranking complete"
        );

        Ranking {
            candidates,
            total_matches,
            band,
        }
    }

    /// Exact item lookup, reported with score `1.0`.
    pub async fn find_item(&self, item_id: &str) -> Option<ScoredCandidate> {
        let wanted = item_id.trim();
        if wanted.is_empty() {
            return None;
        }
        match self.provider.query_by_item_id(wanted, self.fetch_limit).await {
            Ok(records) => records
                .into_iter()
                .find(|r| r.item_id.trim().eq_ignore_ascii_case(wanted))
                .map(|record| ScoredCandidate { record, score: 1.0 }),
            Err(e) => {
                warn!(item_id = wanted, error = %e, "Item lookup failed");
                None
            }
        }
    }

    async fn fetch(
        &self,
        scenario: Scenario,
        query: &RankQuery,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        match (scenario, query.value(MatchField::ItemId)) {
            (Scenario::Identifier, Some(item_id)) => {
                self.provider.query_by_item_id(item_id, self.fetch_limit).await
            }
            _ => {
                let filters = query.to_field_query(self.fetch_limit);
                if filters.is_empty() {
                    debug!("Nothing to query by, skipping provider");
                    return Ok(Vec::new());
                }
                self.provider.query_by_fields(&filters).await
            }
        }
    }
}

/// Score descending, then newest first; undated records sort last among equals.
fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.record.recorded_at.cmp(&a.record.recorded_at))
}
