//! Embedded dense vector store on SQLite.
//!
//! Documents, metadata, and passage embeddings live in one table; queries
//! brute-force cosine distance over every row that passes the metadata
//! pre-filter. Insert order (`rowid`) doubles as the stable corpus order
//! used by sparse rebuilds and tie-breaks, so upserts must never recycle
//! rowids for existing ids.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::debug;

use tifo_core::document::Metadata;
use tifo_core::errors::{StoreError, TifoResult};
use tifo_core::filter::MetadataFilter;
use tifo_core::models::DenseHit;
use tifo_core::traits::IVectorStore;

pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    pub fn open(path: &Path) -> TifoResult<Self> {
        let conn = Connection::open(path).map_err(sqlite_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(sqlite_err)?;
        Self::init(conn)
    }

    /// Ephemeral store (tests).
    pub fn open_in_memory() -> TifoResult<Self> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> TifoResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                metadata TEXT NOT NULL,
                embedding BLOB NOT NULL
            )",
            [],
        )
        .map_err(sqlite_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|e| StoreError::Sqlite {
            message: format!("store lock poisoned: {e}"),
        })
    }
}

impl IVectorStore for SqliteVectorStore {
    fn upsert(
        &self,
        id: &str,
        text: &str,
        metadata: &Metadata,
        embedding: &[f32],
    ) -> TifoResult<()> {
        let metadata_json =
            serde_json::to_string(metadata).map_err(|e| StoreError::VectorStore {
                reason: format!("metadata serialization failed for {id}: {e}"),
            })?;
        let blob = f32_vec_to_bytes(embedding);
        let conn = self.lock()?;
        // DO UPDATE rather than OR REPLACE: replacing would delete and
        // re-insert the row, moving it to the end of the corpus order.
        conn.execute(
            "INSERT INTO documents (id, text, metadata, embedding)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                text = excluded.text,
                metadata = excluded.metadata,
                embedding = excluded.embedding",
            params![id, text, metadata_json, blob],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }

    fn query(
        &self,
        embedding: &[f32],
        filter: Option<&MetadataFilter>,
        top_k: usize,
    ) -> TifoResult<Vec<DenseHit>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, text, metadata, embedding FROM documents ORDER BY rowid")
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })
            .map_err(sqlite_err)?;

        let mut hits: Vec<DenseHit> = Vec::new();
        for row in rows {
            let (id, text, metadata_json, blob) = row.map_err(sqlite_err)?;
            let metadata = parse_metadata(&id, &metadata_json)?;
            if let Some(filter) = filter {
                if !filter.matches(&metadata) {
                    continue;
                }
            }
            let stored = bytes_to_f32_vec(&id, &blob)?;
            if stored.len() != embedding.len() {
                return Err(StoreError::CorruptEmbedding {
                    id,
                    detail: format!(
                        "dimension mismatch: stored {} vs query {}",
                        stored.len(),
                        embedding.len()
                    ),
                }
                .into());
            }
            hits.push(DenseHit {
                id,
                text,
                metadata,
                dense_score: cosine_distance(embedding, &stored),
            });
        }

        // Stable sort keeps corpus order on ties.
        hits.sort_by(|a, b| {
            a.dense_score
                .partial_cmp(&b.dense_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        debug!(hits = hits.len(), top_k, "dense query complete");
        Ok(hits)
    }

    fn snapshot(&self) -> TifoResult<Vec<(String, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, text FROM documents ORDER BY rowid")
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(sqlite_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(sqlite_err)?);
        }
        Ok(out)
    }

    fn document_count(&self) -> TifoResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(sqlite_err)?;
        Ok(count as usize)
    }
}

fn sqlite_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Sqlite {
        message: e.to_string(),
    }
}

fn parse_metadata(id: &str, json: &str) -> TifoResult<Metadata> {
    let value: Value = serde_json::from_str(json).map_err(|e| StoreError::VectorStore {
        reason: format!("corrupt metadata for {id}: {e}"),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::VectorStore {
            reason: format!("metadata for {id} is not an object: {other}"),
        }
        .into()),
    }
}

fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_f32_vec(id: &str, bytes: &[u8]) -> TifoResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(StoreError::CorruptEmbedding {
            id: id.to_string(),
            detail: format!("blob length {} is not a multiple of 4", bytes.len()),
        }
        .into());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// `1 - cosine similarity`, in `[0, 2]`. Zero-norm vectors are treated as
/// maximally dissimilar rather than dividing by zero.
fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}
