//! Field extractor trait: the language-model call that turns an utterance
//! into [`ExtractedFields`].
//!
//! The extractor receives the clues gathered so far so it can resolve
//! follow-up utterances ("the same one, but leaking").

use crate::clues::{AccumulatedClues, ExtractedFields};
use crate::error::ExtractionError;
use async_trait::async_trait;

#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// The extractor name, for logs.
    fn name(&self) -> &str;

    async fn extract(
        &self,
        utterance: &str,
        context: &AccumulatedClues,
    ) -> std::result::Result<ExtractedFields, ExtractionError>;
}
