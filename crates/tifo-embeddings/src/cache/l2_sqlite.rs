//! L2 SQLite-backed embedding cache.
//!
//! Durable `key → vector` rows that survive process restarts. Writes are
//! serialized through an internal mutex, so concurrent worker threads never
//! coordinate locking themselves. `INSERT OR REPLACE` gives last-write-wins
//! on deliberate overwrite; under the hash keying scheme, identical keys
//! always carry identical vectors.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use tifo_core::errors::{EmbeddingError, TifoResult};

pub struct L2SqliteCache {
    conn: Mutex<Connection>,
}

impl L2SqliteCache {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path) -> TifoResult<Self> {
        let conn = Connection::open(path).map_err(cache_err)?;
        // WAL keeps concurrent readers off the writer's back.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(cache_err)?;
        Self::init(conn)
    }

    /// Ephemeral in-memory cache (tests).
    pub fn open_in_memory() -> TifoResult<Self> {
        let conn = Connection::open_in_memory().map_err(cache_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> TifoResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS embedding_cache (
                key TEXT PRIMARY KEY,
                vector BLOB NOT NULL
            )",
            [],
        )
        .map_err(cache_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Look up a vector by cache key.
    pub fn get(&self, key: &str) -> TifoResult<Option<Vec<f32>>> {
        let conn = self.lock()?;
        let row = conn.query_row(
            "SELECT vector FROM embedding_cache WHERE key = ?1",
            params![key],
            |row| row.get::<_, Vec<u8>>(0),
        );
        match row {
            Ok(blob) => Ok(Some(bytes_to_f32_vec(&blob))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(cache_err(e).into()),
        }
    }

    /// Store a vector under a cache key.
    pub fn set(&self, key: &str, vector: &[f32]) -> TifoResult<()> {
        let blob = f32_vec_to_bytes(vector);
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO embedding_cache (key, vector) VALUES (?1, ?2)",
            params![key, blob],
        )
        .map_err(cache_err)?;
        Ok(())
    }

    /// Number of cached vectors.
    pub fn len(&self) -> TifoResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM embedding_cache", [], |row| row.get(0))
            .map_err(cache_err)?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> TifoResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Maintenance: remove every entry.
    pub fn clear(&self) -> TifoResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM embedding_cache", [])
            .map_err(cache_err)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, EmbeddingError> {
        self.conn.lock().map_err(|e| EmbeddingError::Cache {
            message: format!("cache lock poisoned: {e}"),
        })
    }
}

fn cache_err(e: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::Cache {
        message: e.to_string(),
    }
}

fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_is_bit_identical() {
        let cache = L2SqliteCache::open_in_memory().unwrap();
        let vector = vec![1.0f32, 2.5, -3.7, 0.0, f32::MIN_POSITIVE];
        cache.set("deadbeef", &vector).unwrap();
        assert_eq!(cache.get("deadbeef").unwrap(), Some(vector));
    }

    #[test]
    fn miss_returns_none() {
        let cache = L2SqliteCache::open_in_memory().unwrap();
        assert_eq!(cache.get("missing").unwrap(), None);
    }

    #[test]
    fn overwrite_is_last_write_wins() {
        let cache = L2SqliteCache::open_in_memory().unwrap();
        cache.set("k", &[1.0]).unwrap();
        cache.set("k", &[2.0]).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(vec![2.0]));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn clear_works() {
        let cache = L2SqliteCache::open_in_memory().unwrap();
        cache.set("a", &[1.0]).unwrap();
        cache.set("b", &[2.0]).unwrap();
        assert_eq!(cache.len().unwrap(), 2);
        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");
        {
            let cache = L2SqliteCache::open(&path).unwrap();
            cache.set("persist", &[0.5, -0.5]).unwrap();
        }
        let cache = L2SqliteCache::open(&path).unwrap();
        assert_eq!(cache.get("persist").unwrap(), Some(vec![0.5, -0.5]));
    }
}
