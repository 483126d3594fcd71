//! The per-turn intake flow.

use crate::reply;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use workmatch_core::{
    AccumulatedClues, ClueField, ExtractedFields, FieldExtractor, Scenario, ScoredCandidate,
    SessionId, SessionState, SessionStatus, DEFAULT_PRIORITY_PLACEHOLDER,
};
use workmatch_ranking::{Band, RankRequest, Ranking, RecommendationRanker, ScenarioClassifier};
use workmatch_session::{SessionStats, SessionStore};

/// Everything the caller needs to render one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub session_id: SessionId,
    pub scenario: Scenario,
    pub status: SessionStatus,
    pub turn_count: u32,
    pub clues: AccumulatedClues,
    pub missing_fields: Vec<ClueField>,
    pub recommendations: Vec<ScoredCandidate>,
    /// Candidates that cleared the score cutoff, before banding.
    pub total_matches: usize,
    pub band: Band,
    pub reply: String,
}

/// Drives one conversation turn: classify, extract, merge, rank, reply.
pub struct IntakeAgent {
    store: Arc<SessionStore>,
    extractor: Arc<dyn FieldExtractor>,
    ranker: Arc<RecommendationRanker>,
    classifier: ScenarioClassifier,
    priority_placeholder: String,
}

impl IntakeAgent {
    pub fn new(
        store: Arc<SessionStore>,
        extractor: Arc<dyn FieldExtractor>,
        ranker: Arc<RecommendationRanker>,
    ) -> Self {
        Self {
            store,
            extractor,
            ranker,
            classifier: ScenarioClassifier::new(),
            priority_placeholder: DEFAULT_PRIORITY_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_classifier(mut self, classifier: ScenarioClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// The neutral priority that replies should not echo.
    pub fn with_priority_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.priority_placeholder = placeholder.into();
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Handle one utterance. `None` starts a new conversation.
    ///
    /// Never fails: extractor errors count as a turn that stated nothing,
    /// and provider errors as a turn with no candidates.
    pub async fn handle_turn(&self, session_id: Option<&SessionId>, utterance: &str) -> TurnOutcome {
        let id = match session_id {
            Some(id) => id.clone(),
            None => self.store.create(),
        };

        let scenario = self.classifier.classify(utterance);
        debug!(session_id = %id, scenario = %scenario, "Classified utterance");

        let context = self
            .store
            .get(&id)
            .map(|state| state.clues)
            .unwrap_or_default();
        let extracted = match self.extractor.extract(utterance, &context).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!(
                    session_id = %id,
                    extractor = self.extractor.name(),
                    error = %e,
                    "Extraction failed, treating turn as empty"
                );
                ExtractedFields::empty()
            }
        };

        let state = self.store.update(&id, &extracted);
        let ranking = self.rank(&state, scenario).await;
        let missing_fields = state.clues.missing_fields();
        let reply = reply::compose(&state, &missing_fields, &ranking, &self.priority_placeholder);

        info!(
            session_id = %id,
            scenario = %scenario,
            status = %state.status,
            turn = state.turn_count,
            recommendations = ranking.candidates.len(),
            "Turn handled"
        );

        TurnOutcome {
            session_id: id,
            scenario,
            status: state.status,
            turn_count: state.turn_count,
            clues: state.clues,
            missing_fields,
            recommendations: ranking.candidates,
            total_matches: ranking.total_matches,
            band: ranking.band,
            reply,
        }
    }

    /// Close a conversation. `false` if it is unknown or expired.
    pub fn finalize(&self, session_id: &SessionId) -> bool {
        self.store.finalize(session_id)
    }

    /// Drop a conversation. `false` if there was nothing to drop.
    pub fn reset(&self, session_id: &SessionId) -> bool {
        self.store.delete(session_id)
    }

    pub fn session(&self, session_id: &SessionId) -> Option<SessionState> {
        self.store.get(session_id)
    }

    pub fn stats(&self) -> SessionStats {
        self.store.stats()
    }

    async fn rank(&self, state: &SessionState, scenario: Scenario) -> Ranking {
        if !state.status.permits_ranking() {
            return Ranking::empty();
        }
        let request = RankRequest::for_session(state, scenario);
        self.ranker.rank_detailed(&request).await
    }
}
