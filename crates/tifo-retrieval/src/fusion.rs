//! Reciprocal Rank Fusion.
//!
//! Dense distance and BM25 score live on incomparable scales, so fusion
//! works on rank alone: each list contributes `1 / (rank + k)` per item,
//! summed by id. `k` damps the gap between adjacent ranks; at the default
//! of 60 a rank-0 and a rank-1 placement are worth nearly the same, while
//! appearing in both lists is worth roughly twice appearing in one.

use std::collections::HashMap;

use tifo_core::models::RetrievalItem;

/// Fuse one or more ranked lists into a single ranking, descending by
/// summed reciprocal-rank score. Ties keep first-seen order, so a
/// single-list input comes back in its original order.
pub fn reciprocal_rank_fusion(lists: Vec<Vec<RetrievalItem>>, k: u32) -> Vec<RetrievalItem> {
    let k = f64::from(k);
    let mut order: HashMap<String, usize> = HashMap::new();
    let mut fused: Vec<RetrievalItem> = Vec::new();

    for list in lists {
        for (rank, item) in list.into_iter().enumerate() {
            let contribution = 1.0 / (rank as f64 + k);
            match order.get(&item.id) {
                Some(&slot) => {
                    merge_into(&mut fused[slot], item);
                    fused[slot].fused_score += contribution;
                }
                None => {
                    order.insert(item.id.clone(), fused.len());
                    let mut item = item;
                    item.fused_score = contribution;
                    fused.push(item);
                }
            }
        }
    }

    fused.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused
}

/// Merge a later copy of an item into the one already collected. The copy
/// with richer metadata wins text and metadata (the dense arm carries full
/// metadata, the sparse arm only text); native scores are kept from
/// whichever arm produced them.
fn merge_into(existing: &mut RetrievalItem, incoming: RetrievalItem) {
    if existing.metadata.is_empty() && !incoming.metadata.is_empty() {
        existing.metadata = incoming.metadata;
        existing.text = incoming.text;
    }
    if existing.dense_score.is_none() {
        existing.dense_score = incoming.dense_score;
    }
    if existing.bm25_score.is_none() {
        existing.bm25_score = incoming.bm25_score;
    }
}
