//! Grounding policy: is the retrieved evidence safe to answer from?
//!
//! Runs after reranking, on the final truncated list, in three steps:
//! freshness filter, conflict detection, citation selection. Conflicts and
//! thin evidence are not errors; they come back as a normal result with
//! `grounded = false`.
//!
//! Freshness fails closed: an item with no `valid_to`, or one that does
//! not parse as a date, is dropped. Producers that mean "valid forever"
//! stamp the far-future sentinel at ingestion instead.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use tifo_core::constants::{DEFAULT_MIN_SOURCES, MAX_CITATIONS};
use tifo_core::document::{meta_str, Metadata};
use tifo_core::models::{Citation, RetrievalItem, RetrievalResult};

/// Label used when an item carries no provenance metadata at all.
const INTERNAL_KB: &str = "internal://kb";

/// Parse a validity date: ISO `YYYY-MM-DD`, or the compact `YYYYMMDD` form
/// some feeds emit.
pub fn parse_validity_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}

#[derive(Debug, Clone)]
pub struct GroundingPolicy {
    min_sources: usize,
}

impl Default for GroundingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SOURCES)
    }
}

impl GroundingPolicy {
    pub fn new(min_sources: usize) -> Self {
        Self { min_sources }
    }

    /// Judge the final ranked items against `today`.
    pub fn evaluate(&self, items: Vec<RetrievalItem>, today: NaiveDate) -> RetrievalResult {
        let before = items.len();
        let retained: Vec<RetrievalItem> = items
            .into_iter()
            .filter(|item| is_fresh(&item.metadata, today))
            .collect();
        if retained.len() < before {
            debug!(
                dropped = before - retained.len(),
                retained = retained.len(),
                "freshness filter applied"
            );
        }

        let conflicts = detect_conflicts(&retained);
        // Citations are kept even under conflict so the consumer can show
        // the user which sources disagree.
        let (distinct_citations, citations) = select_citations(&retained);
        let grounded = conflicts.is_empty() && distinct_citations >= self.min_sources;

        RetrievalResult {
            results: retained,
            citations,
            has_conflict: !conflicts.is_empty(),
            conflicts,
            grounded,
        }
    }
}

/// `valid_to` present, parseable, and not strictly earlier than `today`.
fn is_fresh(metadata: &Metadata, today: NaiveDate) -> bool {
    meta_str(metadata, "valid_to")
        .and_then(parse_validity_date)
        .map(|valid_to| valid_to >= today)
        .unwrap_or(false)
}

/// Group retained items by `player_id`; a player mapped to more than one
/// distinct non-empty `team` is a conflict. No time-window reasoning here:
/// two fresh documents disagreeing on a player's team make the whole
/// result untrusted even if they describe a legitimate transfer.
fn detect_conflicts(items: &[RetrievalItem]) -> BTreeMap<String, Vec<String>> {
    let mut teams_by_player: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in items {
        let Some(player_id) = meta_str(&item.metadata, "player_id") else {
            continue;
        };
        let Some(team) = meta_str(&item.metadata, "team").filter(|t| !t.is_empty()) else {
            continue;
        };
        let teams = teams_by_player.entry(player_id.to_string()).or_default();
        if !teams.iter().any(|t| t == team) {
            teams.push(team.to_string());
        }
    }
    teams_by_player.retain(|_, teams| teams.len() > 1);
    teams_by_player
}

/// Citations in fused-rank order, deduplicated by (title, date). Returns
/// the distinct count (for the grounding threshold) alongside the list
/// capped for display.
fn select_citations(items: &[RetrievalItem]) -> (usize, Vec<Citation>) {
    let mut citations: Vec<Citation> = Vec::new();
    for item in items {
        let citation = citation_for(&item.metadata);
        let duplicate = citations
            .iter()
            .any(|c| c.title == citation.title && c.date == citation.date);
        if !duplicate {
            citations.push(citation);
        }
    }
    let distinct = citations.len();
    citations.truncate(MAX_CITATIONS);
    (distinct, citations)
}

fn citation_for(metadata: &Metadata) -> Citation {
    let source = meta_str(metadata, "source").unwrap_or(INTERNAL_KB);
    Citation {
        title: meta_str(metadata, "title").unwrap_or(source).to_string(),
        date: meta_str(metadata, "date")
            .or_else(|| meta_str(metadata, "source_date"))
            .unwrap_or("")
            .to_string(),
        url: source.to_string(),
    }
}
