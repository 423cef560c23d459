//! Okapi BM25 over an in-memory corpus snapshot.
//!
//! `Bm25Index` is immutable once built. `SparseIndex` wraps it in an atomic
//! swap: rebuilds construct a fresh index off to the side and publish it in
//! one store, so concurrent searches see either the old snapshot or the new
//! one, never a partial state.
//!
//! IDF follows the Okapi variant with a floor: terms whose raw IDF goes
//! negative (present in most of the corpus) are clamped to
//! `epsilon * average_idf` instead of being allowed to subtract relevance.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use tifo_core::constants::{BM25_B, BM25_EPSILON, BM25_K1};
use tifo_core::errors::{IndexError, TifoResult};
use tifo_core::models::SparseHit;

/// Lowercased alphanumeric tokens. Everything else is a separator, which
/// handles accented Italian text and punctuation-heavy match reports alike.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

struct IndexedDoc {
    id: String,
    text: String,
    term_freqs: HashMap<String, f64>,
    len: f64,
}

/// Immutable BM25 snapshot of a corpus.
pub struct Bm25Index {
    docs: Vec<IndexedDoc>,
    idf: HashMap<String, f64>,
    avgdl: f64,
}

impl Bm25Index {
    /// Build an index from `(id, text)` pairs in stable corpus order.
    pub fn build(corpus: &[(String, String)]) -> Self {
        let mut docs = Vec::with_capacity(corpus.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0.0;

        for (id, text) in corpus {
            let tokens = tokenize(text);
            let mut term_freqs: HashMap<String, f64> = HashMap::new();
            for token in &tokens {
                *term_freqs.entry(token.clone()).or_insert(0.0) += 1.0;
            }
            for term in term_freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += tokens.len() as f64;
            docs.push(IndexedDoc {
                id: id.clone(),
                text: text.clone(),
                term_freqs,
                len: tokens.len() as f64,
            });
        }

        let n = docs.len() as f64;
        let avgdl = if docs.is_empty() { 0.0 } else { total_len / n };

        let mut idf: HashMap<String, f64> = HashMap::with_capacity(doc_freqs.len());
        let mut idf_sum = 0.0;
        let mut negative: Vec<String> = Vec::new();
        for (term, df) in &doc_freqs {
            let value = ((n - *df as f64 + 0.5) / (*df as f64 + 0.5)).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }
        if !idf.is_empty() {
            let floor = BM25_EPSILON * (idf_sum / idf.len() as f64);
            for term in negative {
                idf.insert(term, floor);
            }
        }

        Self { docs, idf, avgdl }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Top `top_k` documents by BM25 score, descending. Ties keep corpus
    /// order. Documents with no query-term overlap are not returned.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SparseHit> {
        let terms = tokenize(query);
        if terms.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = Vec::new();
        for (pos, doc) in self.docs.iter().enumerate() {
            let mut score = 0.0;
            for term in &terms {
                let Some(freq) = doc.term_freqs.get(term) else {
                    continue;
                };
                let idf = self.idf.get(term).copied().unwrap_or(0.0);
                let norm = BM25_K1 * (1.0 - BM25_B + BM25_B * doc.len / self.avgdl);
                score += idf * (freq * (BM25_K1 + 1.0)) / (freq + norm);
            }
            if score > 0.0 {
                scored.push((pos, score));
            }
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(pos, score)| SparseHit {
                id: self.docs[pos].id.clone(),
                text: self.docs[pos].text.clone(),
                bm25_score: score,
            })
            .collect()
    }
}

/// Concurrent front for the BM25 arm with atomic snapshot swap.
pub struct SparseIndex {
    inner: RwLock<Option<Arc<Bm25Index>>>,
}

impl Default for SparseIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseIndex {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Build a fresh snapshot from the corpus and publish it atomically.
    pub fn rebuild(&self, corpus: &[(String, String)]) -> TifoResult<()> {
        let index = Arc::new(Bm25Index::build(corpus));
        let mut guard = self.inner.write().map_err(|e| IndexError::RebuildFailed {
            reason: format!("index lock poisoned: {e}"),
        })?;
        info!(documents = index.len(), "sparse index rebuilt");
        *guard = Some(index);
        Ok(())
    }

    /// Search the current snapshot. `NotReady` until the first rebuild; an
    /// empty corpus counts as ready and simply returns no hits.
    pub fn search(&self, query: &str, top_k: usize) -> TifoResult<Vec<SparseHit>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.search(query, top_k))
    }

    pub fn is_ready(&self) -> bool {
        self.inner.read().map(|g| g.is_some()).unwrap_or(false)
    }

    fn snapshot(&self) -> TifoResult<Arc<Bm25Index>> {
        let guard = self.inner.read().map_err(|e| IndexError::RebuildFailed {
            reason: format!("index lock poisoned: {e}"),
        })?;
        guard.clone().ok_or_else(|| IndexError::NotReady.into())
    }
}
