use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Citation, RetrievalItem};

/// The output of one `retrieve` call. Constructed fresh per call, never
/// persisted; entirely derived from the corpus snapshot at query time.
///
/// `grounded = false` is a normal, successful outcome — the consumer must
/// not fabricate an answer from it, and must surface `conflicts` rather
/// than silently picking a side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Final ranked items, freshness-filtered.
    pub results: Vec<RetrievalItem>,
    /// Up to three citations, deduplicated by (title, date), fused order.
    pub citations: Vec<Citation>,
    pub has_conflict: bool,
    /// player_id → distinct team values seen for that player.
    pub conflicts: BTreeMap<String, Vec<String>>,
    /// Whether the evidence is sufficient, fresh, and consistent enough to
    /// answer from.
    pub grounded: bool,
}
