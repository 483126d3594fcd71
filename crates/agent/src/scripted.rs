//! An extractor that replays pre-recorded extractions.
//!
//! Used to drive recorded transcripts through the agent without calling a
//! language model, and by tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;
use workmatch_core::{AccumulatedClues, ExtractedFields, ExtractionError, FieldExtractor};

/// Hands out queued extractions in order. When the queue is empty every
/// utterance extracts to nothing, unless built with [`ScriptedExtractor::strict`].
#[derive(Debug, Default)]
pub struct ScriptedExtractor {
    queue: Mutex<VecDeque<ExtractedFields>>,
    strict: bool,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: impl IntoIterator<Item = ExtractedFields>) -> Self {
        Self {
            queue: Mutex::new(turns.into_iter().collect()),
            strict: false,
        }
    }

    /// Fail with [`ExtractionError::NotConfigured`] once the script runs out.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn push(&self, fields: ExtractedFields) {
        self.lock().push_back(fields);
    }

    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<ExtractedFields>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FieldExtractor for ScriptedExtractor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn extract(
        &self,
        utterance: &str,
        _context: &AccumulatedClues,
    ) -> Result<ExtractedFields, ExtractionError> {
        let next = self.lock().pop_front();
        match next {
            Some(fields) => {
                debug!(utterance, "Replaying scripted extraction");
                Ok(fields)
            }
            None if self.strict => Err(ExtractionError::NotConfigured(
                "script exhausted".into(),
            )),
            None => Ok(ExtractedFields::empty()),
        }
    }
}
