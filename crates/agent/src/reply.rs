//! User-facing reply text for a turn.
//!
//! Replies are Korean, matching the plant operators who use the intake.

use std::fmt::Write;
use workmatch_core::{ClueField, SessionState, SessionStatus};
use workmatch_ranking::{Band, Ranking};

fn label(field: ClueField) -> &'static str {
    match field {
        ClueField::Location => "위치",
        ClueField::EquipmentType => "설비유형",
        ClueField::StatusCode => "현상코드",
        ClueField::Priority => "우선순위",
    }
}

fn hint(field: ClueField) -> &'static str {
    match field {
        ClueField::Location => "위치/공정 (예: No.1 PE, No.2 PE, 석유제품배합/저장)",
        ClueField::EquipmentType => "설비유형 (예: 압력베젤, 펌프, 열교환기, 탱크, 밸브)",
        ClueField::StatusCode => "현상코드 (예: 고장, 누설, 작동불량, 소음, 진동)",
        ClueField::Priority => "우선순위 (예: 긴급작업, 일반작업)",
    }
}

/// Compose the reply for a turn that ended in `state`.
///
/// `priority_placeholder` is the extractor's neutral priority; it is never echoed back.
pub fn compose(
    state: &SessionState,
    missing: &[ClueField],
    ranking: &Ranking,
    priority_placeholder: &str,
) -> String {
    match state.status {
        SessionStatus::CollectingInfo => collecting(state, missing, priority_placeholder),
        SessionStatus::Recommending => recommending(state, ranking, priority_placeholder),
        SessionStatus::Finalizing => finalizing(state, ranking),
        SessionStatus::Completed => {
            "✅ 이 작업요청은 이미 완료되었습니다.\n\n새 요청은 새 대화에서 시작해주세요.".to_string()
        }
    }
}

fn gathered(state: &SessionState, priority_placeholder: &str, mark: &str, out: &mut String) {
    for field in ClueField::ALL {
        let Some(value) = state.clues.value(field) else {
            continue;
        };
        if field == ClueField::Priority && value == priority_placeholder {
            continue;
        }
        let _ = writeln!(out, "• {}: {value}{mark}", label(field));
    }
}

fn collecting(state: &SessionState, missing: &[ClueField], priority_placeholder: &str) -> String {
    let mut out = String::from("📝 작업 정보를 수집하고 있습니다.\n\n");
    gathered(state, priority_placeholder, " ✅", &mut out);

    if !missing.is_empty() {
        out.push_str("\n❗ 추가로 필요한 정보:\n");
        for field in missing {
            let _ = writeln!(out, "• {}", hint(*field));
        }
        out.push_str("\n💡 또는 작업대상(ITEMNO)과 현상코드를 직접 입력하셔도 됩니다.");
    }
    out
}

fn recommending(state: &SessionState, ranking: &Ranking, priority_placeholder: &str) -> String {
    if ranking.is_empty() {
        return "❌ 입력하신 조건으로 유사한 작업을 찾을 수 없습니다.\n\n다른 조건으로 다시 시도해주세요."
            .to_string();
    }

    let shown = ranking.candidates.len();
    let mut out = format!("🎯 {shown}개의 유사한 작업을 찾았습니다!\n\n📋 수집된 정보:\n");
    gathered(state, priority_placeholder, "", &mut out);

    match ranking.band {
        Band::FirstPage => {
            let _ = write!(out, "\n총 {}건 중 상위 {shown}건입니다.", ranking.total_matches);
        }
        Band::Overflow => {
            let _ = write!(
                out,
                "\n🔎 유사한 작업이 {}건으로 너무 많습니다. 작업대상(ITEMNO)을 입력하시면 정확히 찾아드립니다.",
                ranking.total_matches
            );
        }
        Band::All | Band::Empty => {}
    }

    let _ = write!(
        out,
        "\n\n💡 턴 {}: 아래 추천 목록에서 가장 적합한 작업을 선택해주세요.",
        state.turn_count
    );
    out
}

fn finalizing(state: &SessionState, ranking: &Ranking) -> String {
    if ranking.is_empty() {
        let item = state.clues.item_id().unwrap_or_default();
        return format!(
            "❌ ITEMNO {item}에 해당하는 작업을 찾을 수 없습니다.\n\n올바른 ITEMNO를 입력하거나 작업 내용을 설명해주세요."
        );
    }
    "✅ 작업 정보가 완성되었습니다!\n\n선택하신 작업으로 작업요청을 생성하시겠습니까?".to_string()
}
