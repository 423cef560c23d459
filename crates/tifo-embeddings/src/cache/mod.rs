//! Two-tier embedding cache: moka L1 in front of a durable SQLite L2.
//!
//! Keys are SHA-256 digests of (model, role prefix, raw text), so an
//! identical triple always resolves to the same stored vector. Entries are
//! never evicted from L2; `clear` exists for maintenance off the hot path.

pub mod l1_memory;
pub mod l2_sqlite;

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use tifo_core::errors::TifoResult;

pub use l1_memory::L1MemoryCache;
pub use l2_sqlite::L2SqliteCache;

/// Cache key for a (model, text, prefix) triple: hex SHA-256 of
/// `model | prefix | text`.
pub fn cache_key(model: &str, text: &str, prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update(b"|");
    hasher.update(prefix.as_bytes());
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Read-through coordinator over both cache tiers.
///
/// Reads hit L1 first, then L2 (promoting into L1); writes go through to
/// both tiers.
pub struct CacheCoordinator {
    l1: L1MemoryCache,
    l2: L2SqliteCache,
}

impl CacheCoordinator {
    /// Open the durable tier at `path` and build the L1 tier in front of it.
    pub fn open(path: &Path, l1_capacity: u64) -> TifoResult<Self> {
        Ok(Self {
            l1: L1MemoryCache::new(l1_capacity),
            l2: L2SqliteCache::open(path)?,
        })
    }

    /// Fully in-memory coordinator (tests and ephemeral runs).
    pub fn in_memory(l1_capacity: u64) -> TifoResult<Self> {
        Ok(Self {
            l1: L1MemoryCache::new(l1_capacity),
            l2: L2SqliteCache::open_in_memory()?,
        })
    }

    /// Look up the vector for a (model, text, prefix) triple.
    pub fn get(&self, model: &str, text: &str, prefix: &str) -> TifoResult<Option<Vec<f32>>> {
        let key = cache_key(model, text, prefix);
        if let Some(vector) = self.l1.get(&key) {
            return Ok(Some(vector));
        }
        match self.l2.get(&key)? {
            Some(vector) => {
                self.l1.insert(key, vector.clone());
                Ok(Some(vector))
            }
            None => Ok(None),
        }
    }

    /// Write a vector through both tiers.
    pub fn set(&self, model: &str, text: &str, prefix: &str, vector: &[f32]) -> TifoResult<()> {
        let key = cache_key(model, text, prefix);
        self.l2.set(&key, vector)?;
        self.l1.insert(key, vector.to_vec());
        Ok(())
    }

    /// Number of durable entries.
    pub fn len(&self) -> TifoResult<usize> {
        self.l2.len()
    }

    pub fn is_empty(&self) -> TifoResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Maintenance: drop every entry from both tiers.
    pub fn clear(&self) -> TifoResult<()> {
        self.l2.clear()?;
        self.l1.clear();
        debug!("embedding cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        let a = cache_key("model-a", "some text", "query: ");
        let b = cache_key("model-a", "some text", "query: ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn key_varies_with_each_component() {
        let base = cache_key("model-a", "some text", "query: ");
        assert_ne!(base, cache_key("model-b", "some text", "query: "));
        assert_ne!(base, cache_key("model-a", "other text", "query: "));
        assert_ne!(base, cache_key("model-a", "some text", "passage: "));
    }

    #[test]
    fn roundtrip_through_both_tiers() {
        let cache = CacheCoordinator::in_memory(16).unwrap();
        let vector = vec![0.25f32, -0.5, 0.75];
        cache.set("m", "text", "", &vector).unwrap();
        assert_eq!(cache.get("m", "text", "").unwrap(), Some(vector));
        assert_eq!(cache.get("m", "text", "query: ").unwrap(), None);
    }

    #[test]
    fn l2_hit_is_promoted_to_l1() {
        let cache = CacheCoordinator::in_memory(16).unwrap();
        let vector = vec![1.0f32, 2.0];
        cache.l2.set(&cache_key("m", "t", ""), &vector).unwrap();
        // First read comes from L2; second from L1. Both bit-identical.
        assert_eq!(cache.get("m", "t", "").unwrap(), Some(vector.clone()));
        assert_eq!(cache.l1.get(&cache_key("m", "t", "")), Some(vector));
    }

    #[test]
    fn clear_empties_both_tiers() {
        let cache = CacheCoordinator::in_memory(16).unwrap();
        cache.set("m", "a", "", &[1.0]).unwrap();
        cache.set("m", "b", "", &[2.0]).unwrap();
        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
        assert_eq!(cache.get("m", "a", "").unwrap(), None);
    }
}
