//! End-to-end tests for the workmatch intake pipeline.
//!
//! These wire the crates together the way the binary does: a config file on
//! disk, a provider opened from it, and full conversations through the agent.

use std::path::Path;
use std::sync::Arc;

use workmatch_agent::{IntakeAgent, ScriptedExtractor};
use workmatch_config::AppConfig;
use workmatch_core::{CandidateRecord, ExtractedFields, Scenario, SessionStatus};
use workmatch_ranking::{Band, RecommendationRanker};
use workmatch_session::SessionStore;
use workmatch_store::{open_provider, SqliteCandidates};

// ── Fixtures ─────────────────────────────────────────────────────────────

fn history_line(n: u32) -> String {
    format!(
        r#"{{"itemno":"PE-V{n:04}","process":"No.1 PE","location":"No.1 PE","equipType":"압력베젤","statusCode":"고장","priority":"일반작업","recorded_at":"2024-02-{n:02}T09:00:00Z"}}"#
    )
}

fn write_history(path: &Path) {
    let mut lines: Vec<String> = (1..=8).map(history_line).collect();
    lines.push(
        r#"{"itemno":"RFCC-00123","process":"RFCC","location":"RFCC","equipType":"열교환기","statusCode":"누설","priority":"긴급작업"}"#
            .to_string(),
    );
    lines.push("this line is not a record".to_string());
    std::fs::write(path, lines.join("\n")).unwrap();
}

fn write_config(dir: &Path, history: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let toml = format!(
        r#"
[ranking]
page_size = 3
overflow_limit = 6

[store]
backend = "jsonl"
path = "{}"
"#,
        history.display()
    );
    std::fs::write(&path, toml).unwrap();
    path
}

struct Pipeline {
    agent: IntakeAgent,
    extractor: Arc<ScriptedExtractor>,
}

async fn pipeline(config: &AppConfig) -> Pipeline {
    let provider = open_provider(&config.store).await.unwrap();
    let ranker = Arc::new(RecommendationRanker::from_config(provider, &config.ranking));
    let extractor = Arc::new(ScriptedExtractor::new());
    let agent = IntakeAgent::new(
        Arc::new(SessionStore::from_config(config)),
        extractor.clone(),
        ranker,
    )
    .with_priority_placeholder(config.merge.priority_placeholder.clone());
    Pipeline { agent, extractor }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn configured_jsonl_conversation_from_description_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.jsonl");
    write_history(&history);
    let config = AppConfig::load_from(&write_config(dir.path(), &history)).unwrap();
    assert_eq!(config.ranking.page_size, 3);

    let p = pipeline(&config).await;

    p.extractor
        .push(ExtractedFields::with_confidence(0.9).with_location("No.1 PE"));
    let first = p.agent.handle_turn(None, "No.1 PE 쪽입니다").await;
    assert_eq!(first.status, SessionStatus::CollectingInfo);
    assert!(first.recommendations.is_empty());

    p.extractor.push(
        ExtractedFields::with_confidence(0.9)
            .with_equipment_type("압력베젤")
            .with_status_code("고장"),
    );
    let second = p
        .agent
        .handle_turn(Some(&first.session_id), "압력베젤이 고장났어요")
        .await;
    assert_eq!(second.status, SessionStatus::Recommending);
    assert_eq!(second.total_matches, 8);
    assert_eq!(second.band, Band::Overflow);
    assert_eq!(second.recommendations.len(), 3);
    assert_eq!(second.recommendations[0].record.item_id, "PE-V0008");
    assert!(second.reply.contains("8건으로 너무 많습니다"));

    p.extractor
        .push(ExtractedFields::with_confidence(0.95).with_item_id("PE-V0003"));
    let third = p
        .agent
        .handle_turn(Some(&first.session_id), "PE-V0003 입니다")
        .await;
    assert_eq!(third.scenario, Scenario::Identifier);
    assert_eq!(third.status, SessionStatus::Finalizing);
    assert_eq!(third.recommendations.len(), 1);
    assert_eq!(third.recommendations[0].record.item_id, "PE-V0003");
    assert_eq!(third.clues.location(), Some("No.1 PE"));

    assert!(p.agent.finalize(&first.session_id));
    let stats = p.agent.stats();
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.status_breakdown.get("completed"), Some(&1));
}

#[tokio::test]
async fn separate_conversations_share_one_provider() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.jsonl");
    write_history(&history);
    let config = AppConfig::load_from(&write_config(dir.path(), &history)).unwrap();
    let p = pipeline(&config).await;

    p.extractor.push(
        ExtractedFields::with_confidence(0.9)
            .with_item_id("RFCC-00123")
            .with_status_code("누설"),
    );
    p.extractor
        .push(ExtractedFields::with_confidence(0.9).with_location("No.1 PE"));

    let lookup = p.agent.handle_turn(None, "RFCC-00123 누설").await;
    let described = p.agent.handle_turn(None, "No.1 PE").await;

    assert_ne!(lookup.session_id, described.session_id);
    assert_eq!(lookup.recommendations[0].record.priority, "긴급작업");
    assert!(described.clues.item_id().is_none());
    assert_eq!(p.agent.stats().total_sessions, 2);
}

#[tokio::test]
async fn sqlite_history_ranks_like_the_file_store() {
    let provider = SqliteCandidates::open("sqlite::memory:").await.unwrap();
    for (id, status) in [("PE-V2884", "고장"), ("PE-V2885", "누설"), ("PE-P0101", "고장")] {
        provider
            .insert(&CandidateRecord {
                item_id: id.into(),
                process: "No.1 PE".into(),
                location: "No.1 PE".into(),
                cost_center: None,
                equipment_type: if id.starts_with("PE-V") { "압력베젤" } else { "펌프" }.into(),
                status_code: status.into(),
                priority: "일반작업".into(),
                work_title: None,
                work_details: None,
                recorded_at: None,
            })
            .await
            .unwrap();
    }

    let extractor = Arc::new(ScriptedExtractor::from_turns([ExtractedFields::with_confidence(0.9)
        .with_location("No.1 PE")
        .with_equipment_type("압력베젤")
        .with_status_code("고장")]));
    let agent = IntakeAgent::new(
        Arc::new(SessionStore::default()),
        extractor,
        Arc::new(RecommendationRanker::new(Arc::new(provider))),
    );

    let outcome = agent.handle_turn(None, "No.1 PE 압력베젤 고장").await;
    assert_eq!(outcome.status, SessionStatus::Recommending);
    assert_eq!(outcome.band, Band::All);
    let ids: Vec<&str> = outcome
        .recommendations
        .iter()
        .map(|c| c.record.item_id.as_str())
        .collect();
    assert_eq!(ids, vec!["PE-V2884"]);
}
