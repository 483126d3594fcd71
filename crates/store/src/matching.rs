//! The lookup rules shared by the in-process providers.
//!
//! Every present filter must be a case-insensitive substring of its column,
//! and `location` may also hit the `process` column. Records whose own
//! `location` column matched come first, then newest first.

use std::cmp::Ordering;
use workmatch_core::{CandidateRecord, FieldQuery};

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn matches_fields(record: &CandidateRecord, query: &FieldQuery) -> bool {
    if let Some(location) = present(&query.location) {
        if !contains(&record.location, location) && !contains(&record.process, location) {
            return false;
        }
    }

    let columns = [
        (&query.equipment_type, &record.equipment_type),
        (&query.status_code, &record.status_code),
        (&query.priority, &record.priority),
    ];
    columns
        .into_iter()
        .all(|(wanted, column)| present(wanted).is_none_or(|w| contains(column, w)))
}

pub fn matches_item_id(record: &CandidateRecord, item_id: &str) -> bool {
    let item_id = item_id.trim();
    !item_id.is_empty() && contains(&record.item_id, item_id)
}

/// Filter, order and truncate per the shared rules.
pub fn select_by_fields(records: &[CandidateRecord], query: &FieldQuery) -> Vec<CandidateRecord> {
    let location = present(&query.location);
    let mut hits: Vec<CandidateRecord> = records
        .iter()
        .filter(|r| matches_fields(r, query))
        .cloned()
        .collect();

    hits.sort_by(|a, b| {
        let a_hit = location.is_some_and(|l| contains(&a.location, l));
        let b_hit = location.is_some_and(|l| contains(&b.location, l));
        b_hit.cmp(&a_hit).then_with(|| newest_first(a, b))
    });
    hits.truncate(query.limit);
    hits
}

pub fn select_by_item_id(
    records: &[CandidateRecord],
    item_id: &str,
    limit: usize,
) -> Vec<CandidateRecord> {
    let mut hits: Vec<CandidateRecord> = records
        .iter()
        .filter(|r| matches_item_id(r, item_id))
        .cloned()
        .collect();
    hits.sort_by(newest_first);
    hits.truncate(limit);
    hits
}

fn newest_first(a: &CandidateRecord, b: &CandidateRecord) -> Ordering {
    b.recorded_at.cmp(&a.recorded_at)
}
