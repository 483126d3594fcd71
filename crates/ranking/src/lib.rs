//! Matching a request against historical work records.
//!
//! [`classify`] decides whether an utterance is an identifier lookup or a
//! description. [`RecommendationRanker`] fetches candidates from a
//! [`CandidateProvider`](workmatch_core::CandidateProvider), scores each with
//! [`SimilarityScorer`], drops noise, and shapes the list with
//! [`ResultBander`].

pub mod bander;
pub mod classifier;
pub mod ranker;
pub mod scorer;
pub mod similarity;
pub mod summary;

pub use bander::{Band, ResultBander};
pub use classifier::{classify, ScenarioAnalysis, ScenarioClassifier};
pub use ranker::{RankRequest, Ranking, RecommendationRanker};
pub use scorer::{MatchField, RankQuery, SimilarityScorer, WeightTable};
pub use similarity::similarity;
pub use summary::{filter_by_priority, RankingSummary};
