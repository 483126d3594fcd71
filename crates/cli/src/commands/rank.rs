//! `workmatch rank`: one-shot ranking against the work history.

use super::{load_config, provider};
use std::path::PathBuf;
use workmatch_core::{Scenario, ScoredCandidate};
use workmatch_ranking::{
    filter_by_priority, Band, RankQuery, RankRequest, RankingSummary, RecommendationRanker,
};

pub fn query_from_flags(
    location: Option<String>,
    equipment: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    item_id: Option<String>,
) -> RankQuery {
    RankQuery {
        item_id,
        location,
        equipment_type: equipment,
        status_code: status,
        priority,
    }
}

/// An item id on the command line means an identifier lookup.
pub fn request_for(query: RankQuery) -> RankRequest {
    let scenario = if query.item_id.as_deref().is_some_and(|id| !id.trim().is_empty()) {
        Scenario::Identifier
    } else {
        Scenario::Descriptive
    };
    RankRequest::new(scenario, query)
}

/// Output switches for `workmatch rank`.
#[derive(Debug, Default)]
pub struct RankOptions {
    /// Keep only candidates whose priority equals this.
    pub only_priority: Option<String>,
    /// Look the item id up directly instead of ranking.
    pub exact: bool,
    pub json: bool,
}

/// Apply `--only-priority` to the full match list, before banding.
fn narrow(scored: Vec<ScoredCandidate>, only_priority: Option<&str>) -> Vec<ScoredCandidate> {
    match only_priority {
        Some(priority) => filter_by_priority(&scored, priority),
        None => scored,
    }
}

fn print_candidate(rank: usize, c: &ScoredCandidate) {
    println!(
        "  {:>2}. [{:.2}] {}  {} / {} / {} / {}",
        rank,
        c.score,
        c.record.item_id,
        c.record.location,
        c.record.equipment_type,
        c.record.status_code,
        c.record.priority
    );
    if let Some(title) = &c.record.work_title {
        println!("      {title}");
    }
}

pub async fn run(
    query: RankQuery,
    records: Option<PathBuf>,
    options: RankOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let provider = provider(&config, records).await?;
    let ranker = RecommendationRanker::from_config(provider, &config.ranking);

    if options.exact {
        let item_id = query
            .item_id
            .clone()
            .ok_or("--exact needs --item-id")?;
        let found = ranker.find_item(&item_id).await;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&found)?);
        } else {
            match &found {
                Some(c) => print_candidate(1, c),
                None => println!("ITEMNO {item_id} not found."),
            }
        }
        return Ok(());
    }

    let request = request_for(query);
    let ranking = ranker.banded(narrow(
        ranker.matches(&request).await,
        options.only_priority.as_deref(),
    ));

    if options.json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }

    println!(
        "Scenario: {}  Provider: {}",
        request.effective_scenario(),
        ranker.provider_name()
    );

    if ranking.candidates.is_empty() {
        println!("\nNo similar work found. Try fewer or broader fields.");
        return Ok(());
    }

    println!();
    for (i, c) in ranking.candidates.iter().enumerate() {
        print_candidate(i + 1, c);
    }

    let summary = RankingSummary::from_candidates(&ranking.candidates);
    println!(
        "\n  {} shown of {} matches (band: {}), avg {:.3}, top {:.2}, lowest {:.2}",
        summary.total_count,
        ranking.total_matches,
        ranking.band,
        summary.average_score,
        summary.top_score,
        summary.lowest_score
    );
    if ranking.band == Band::Overflow {
        println!("  Too many matches; pass --item-id for an exact lookup.");
    }

    Ok(())
}
