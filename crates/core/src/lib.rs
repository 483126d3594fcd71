//! # workmatch core
//!
//! Domain types, merge rules, and collaborator traits for the workmatch
//! intake assistant. This crate has **no framework dependencies**. It defines
//! the model that the session, ranking and store crates build on.
//!
//! ## Design Philosophy
//!
//! The two external collaborators (field extraction and the record store)
//! are traits here. Everything else in this crate is a pure function over
//! plain data:
//! - [`ClueMerger`] folds a turn's extraction into the session's clues
//! - [`derive_status`] computes the session status from those clues

pub mod error;
pub mod clues;
pub mod session;
pub mod scenario;
pub mod record;
pub mod provider;
pub mod extractor;

// Re-export key types at crate root for ergonomics
pub use error::{ExtractionError, ProviderError};
pub use clues::{
    AccumulatedClues, Clue, ClueField, ClueMerger, Confidence, ExtractedFields,
    DEFAULT_CONFIDENCE_MARGIN, DEFAULT_PRIORITY_PLACEHOLDER,
};
pub use session::{derive_status, SessionId, SessionState, SessionStatus};
pub use scenario::Scenario;
pub use record::{CandidateRecord, FieldQuery, ScoredCandidate};
pub use provider::CandidateProvider;
pub use extractor::FieldExtractor;
