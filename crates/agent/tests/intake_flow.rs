//! End-to-end turns through the agent with scripted extraction and in-memory history.

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use workmatch_agent::{IntakeAgent, ScriptedExtractor};
use workmatch_core::{CandidateRecord, ClueField, ClueMerger, ExtractedFields, Scenario, SessionStatus};
use workmatch_ranking::{Band, RecommendationRanker};
use workmatch_session::{ManualClock, SessionSettings, SessionStore};
use workmatch_store::InMemoryCandidates;

fn record(item_id: &str, location: &str, equipment: &str, status: &str, day: u32) -> CandidateRecord {
    CandidateRecord {
        item_id: item_id.into(),
        process: location.into(),
        location: location.into(),
        cost_center: None,
        equipment_type: equipment.into(),
        status_code: status.into(),
        priority: "일반작업".into(),
        work_title: Some(format!("{equipment} {status} 조치")),
        work_details: None,
        recorded_at: Some(Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap()),
    }
}

fn history() -> Vec<CandidateRecord> {
    vec![
        record("PE-V2884", "No.1 PE", "압력베젤", "고장", 10),
        record("PE-V2885", "No.1 PE", "압력베젤", "누설", 11),
        record("PE-P0101", "No.1 PE", "펌프", "진동", 12),
        record("PE-V3001", "No.2 PE", "압력베젤", "고장", 13),
        record("RFCC-00123", "RFCC", "열교환기", "누설", 14),
    ]
}

struct Harness {
    agent: IntakeAgent,
    extractor: Arc<ScriptedExtractor>,
    clock: Arc<ManualClock>,
}

fn harness(records: Vec<CandidateRecord>) -> Harness {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(SessionStore::with_clock(
        SessionSettings::default(),
        ClueMerger::default(),
        clock.clone(),
    ));
    let extractor = Arc::new(ScriptedExtractor::new());
    let ranker = Arc::new(RecommendationRanker::new(Arc::new(
        InMemoryCandidates::from_records(records),
    )));
    Harness {
        agent: IntakeAgent::new(store, extractor.clone(), ranker),
        extractor,
        clock,
    }
}

#[tokio::test]
async fn two_turn_descriptive_conversation() {
    let h = harness(history());

    h.extractor
        .push(ExtractedFields::with_confidence(0.9).with_location("No.1 PE"));
    let first = h.agent.handle_turn(None, "No.1 PE").await;
    assert_eq!(first.scenario, Scenario::Descriptive);
    assert_eq!(first.status, SessionStatus::CollectingInfo);
    assert_eq!(
        first.missing_fields,
        vec![ClueField::EquipmentType, ClueField::StatusCode]
    );
    assert!(first.recommendations.is_empty());
    assert!(first.reply.contains("추가로 필요한 정보"));

    h.extractor.push(
        ExtractedFields::with_confidence(0.85)
            .with_equipment_type("압력베젤")
            .with_status_code("고장"),
    );
    let second = h
        .agent
        .handle_turn(Some(&first.session_id), "압력베젤 고장")
        .await;
    assert_eq!(second.session_id, first.session_id);
    assert_eq!(second.status, SessionStatus::Recommending);
    assert_eq!(second.turn_count, 2);
    assert!(second.missing_fields.is_empty());
    assert_eq!(second.clues.location(), Some("No.1 PE"));

    // Only PE-V2884 matches every filter in the store lookup.
    assert_eq!(second.recommendations.len(), 1);
    assert_eq!(second.recommendations[0].record.item_id, "PE-V2884");
    assert!(second.recommendations[0].score >= 0.9);
    assert_eq!(second.band, Band::All);
    assert!(second.reply.starts_with("🎯 1개의 유사한 작업을 찾았습니다!"));
}

#[tokio::test]
async fn lower_confidence_turn_does_not_override() {
    let h = harness(history());
    h.extractor
        .push(ExtractedFields::with_confidence(0.5).with_location("No.1 PE"));
    h.extractor
        .push(ExtractedFields::with_confidence(0.55).with_location("No.2 PE"));
    h.extractor
        .push(ExtractedFields::with_confidence(0.65).with_location("No.2 PE"));

    let id = h.agent.handle_turn(None, "No.1 PE").await.session_id;
    let kept = h.agent.handle_turn(Some(&id), "No.2 PE?").await;
    assert_eq!(kept.clues.location(), Some("No.1 PE"));
    let switched = h.agent.handle_turn(Some(&id), "No.2 PE").await;
    assert_eq!(switched.clues.location(), Some("No.2 PE"));
}

#[tokio::test]
async fn identifier_turn_finalizes_and_ranks_by_item() {
    let h = harness(history());
    h.extractor.push(
        ExtractedFields::with_confidence(0.9)
            .with_item_id("RFCC-00123")
            .with_status_code("누설"),
    );

    let outcome = h.agent.handle_turn(None, "RFCC-00123 누설").await;
    assert_eq!(outcome.scenario, Scenario::Identifier);
    assert_eq!(outcome.status, SessionStatus::Finalizing);
    assert_eq!(outcome.recommendations.len(), 1);
    assert_eq!(outcome.recommendations[0].record.item_id, "RFCC-00123");
    assert!(outcome.reply.contains("작업 정보가 완성되었습니다"));
}

#[tokio::test]
async fn unknown_item_reports_no_match() {
    let h = harness(history());
    h.extractor
        .push(ExtractedFields::with_confidence(0.9).with_item_id("HDS-99999"));
    let outcome = h.agent.handle_turn(None, "HDS-99999").await;
    assert_eq!(outcome.status, SessionStatus::Finalizing);
    assert!(outcome.recommendations.is_empty());
    assert!(outcome.reply.contains("ITEMNO HDS-99999"));
}

#[tokio::test]
async fn many_matches_are_banded_to_a_page() {
    let records: Vec<CandidateRecord> = (1..=20)
        .map(|i| record(&format!("PE-V{i:04}"), "No.1 PE", "압력베젤", "고장", i))
        .collect();
    let h = harness(records);
    h.extractor.push(
        ExtractedFields::with_confidence(0.9)
            .with_location("No.1 PE")
            .with_equipment_type("압력베젤")
            .with_status_code("고장"),
    );

    let outcome = h.agent.handle_turn(None, "No.1 PE 압력베젤 고장").await;
    assert_eq!(outcome.band, Band::Overflow);
    assert_eq!(outcome.total_matches, 20);
    assert_eq!(outcome.recommendations.len(), 5);
    // Equal scores: newest records first.
    assert_eq!(outcome.recommendations[0].record.item_id, "PE-V0020");
    assert!(outcome.reply.contains("ITEMNO"));
}

#[tokio::test]
async fn expired_session_restarts_under_same_id() {
    let h = harness(history());
    h.extractor
        .push(ExtractedFields::with_confidence(0.9).with_location("No.1 PE"));
    let first = h.agent.handle_turn(None, "No.1 PE").await;

    h.clock.advance(Duration::minutes(31));
    assert!(h.agent.session(&first.session_id).is_none());

    let again = h.agent.handle_turn(Some(&first.session_id), "hello?").await;
    assert_eq!(again.session_id, first.session_id);
    assert_eq!(again.turn_count, 1);
    assert!(again.clues.location().is_none());
}

#[tokio::test]
async fn concurrent_conversations_do_not_interfere() {
    let h = Arc::new(harness(history()));
    let mut handles = Vec::new();
    for i in 0..8 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            let id = workmatch_core::SessionId(format!("conv-{i}"));
            for _ in 0..5 {
                h.agent.handle_turn(Some(&id), "...").await;
            }
            id
        }));
    }

    for handle in handles {
        let id = handle.await.unwrap();
        assert_eq!(h.agent.session(&id).unwrap().turn_count, 5);
    }
    assert_eq!(h.agent.stats().total_sessions, 8);
}
