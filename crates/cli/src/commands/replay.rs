//! `workmatch replay`: drive a recorded transcript through the intake agent.
//!
//! Each non-blank line is `{"utterance": "...", "fields": {...}}`, where
//! `fields` is what the extractor produced for that utterance. Lines
//! starting with `#` are comments.

use super::{load_config, provider};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use workmatch_agent::{IntakeAgent, ScriptedExtractor, TurnOutcome};
use workmatch_core::{ExtractedFields, SessionId};
use workmatch_ranking::RecommendationRanker;
use workmatch_session::{spawn_sweeper, SessionStore};

#[derive(Debug, Deserialize)]
pub struct TranscriptTurn {
    pub utterance: String,
    #[serde(default)]
    pub fields: ExtractedFields,
}

pub fn parse_transcript(content: &str) -> Result<Vec<TranscriptTurn>, String> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| format!("transcript line {}: {e}", n + 1))
        })
        .collect()
}

/// Feed every turn into one conversation, returning each turn's outcome.
pub async fn replay_turns(
    agent: &IntakeAgent,
    extractor: &ScriptedExtractor,
    turns: Vec<TranscriptTurn>,
) -> Vec<TurnOutcome> {
    let mut session: Option<SessionId> = None;
    let mut outcomes = Vec::with_capacity(turns.len());
    for turn in turns {
        extractor.push(turn.fields);
        let outcome = agent.handle_turn(session.as_ref(), &turn.utterance).await;
        session = Some(outcome.session_id.clone());
        outcomes.push(outcome);
    }
    outcomes
}

pub async fn run(
    transcript: &Path,
    records: Option<PathBuf>,
    finalize: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let content = std::fs::read_to_string(transcript)
        .map_err(|e| format!("Failed to read {}: {e}", transcript.display()))?;
    let turns = parse_transcript(&content)?;
    info!(turns = turns.len(), "Replaying transcript");

    let store = Arc::new(SessionStore::from_config(&config));
    let sweeper = spawn_sweeper(
        store.clone(),
        Duration::from_secs(config.session.cleanup_interval_secs.max(1)),
    );
    let extractor = Arc::new(ScriptedExtractor::new());
    let ranker = Arc::new(RecommendationRanker::from_config(
        provider(&config, records).await?,
        &config.ranking,
    ));
    let agent = IntakeAgent::new(store, extractor.clone(), ranker)
        .with_priority_placeholder(config.merge.priority_placeholder.clone());

    let outcomes = replay_turns(&agent, &extractor, turns).await;
    for outcome in &outcomes {
        println!(
            "── turn {} [{} / {}] ──",
            outcome.turn_count, outcome.scenario, outcome.status
        );
        println!("{}", outcome.reply);
        for (i, c) in outcome.recommendations.iter().enumerate() {
            println!("  {:>2}. [{:.2}] {}", i + 1, c.score, c.record.item_id);
        }
        println!();
    }

    if let Some(last) = outcomes.last() {
        if finalize && agent.finalize(&last.session_id) {
            println!("Session {} completed.", last.session_id);
        }
    }
    println!("{}", serde_json::to_string_pretty(&agent.stats())?);

    sweeper.abort();
    Ok(())
}
