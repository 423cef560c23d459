//! L1 in-memory cache using moka.
//!
//! TinyLFU admission policy, per-entry TTL. Purely an accelerator in front
//! of the durable tier; carries no durability obligations.

use std::time::Duration;

use moka::sync::Cache;

/// L1 in-memory embedding cache. Keys are cache-key digests, values are
/// embedding vectors.
pub struct L1MemoryCache {
    cache: Cache<String, Vec<f32>>,
}

impl L1MemoryCache {
    /// Create a new L1 cache with the given max entry count.
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600))
            .time_to_live(Duration::from_secs(86400))
            .build();

        Self { cache }
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: String, vector: Vec<f32>) {
        self.cache.insert(key, vector);
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let cache = L1MemoryCache::new(100);
        cache.insert("abc".to_string(), vec![1.0, 2.0, 3.0]);
        assert_eq!(cache.get("abc"), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn miss_returns_none() {
        let cache = L1MemoryCache::new(100);
        assert_eq!(cache.get("nonexistent"), None);
    }

    #[test]
    fn clear_empties_cache() {
        let cache = L1MemoryCache::new(100);
        cache.insert("a".to_string(), vec![1.0]);
        cache.insert("b".to_string(), vec![2.0]);
        cache.clear();
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), None);
    }
}
