//! SQLite-backed persistent vector index.
//!
//! Layout is exactly `id -> (vector, text)`: one row per chunk, vector
//! stored as a little-endian f32 BLOB. The file survives process restarts;
//! the startup corpus check is a plain row count.

use crate::index::{cosine_similarity, VectorIndex, UPSERT_BATCH_SIZE};
use crate::types::{ChunkId, IndexEntry, RetrievalResult, ScoredChunk};
use handbook_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Persistent vector index on SQLite.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Open (or create) the index database at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Index(format!("Failed to create index directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                vector BLOB NOT NULL,
                text TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Index("Index connection lock poisoned".to_string()))
    }
}

impl VectorIndex for SqliteIndex {
    fn upsert(&self, entries: &[IndexEntry]) -> AppResult<usize> {
        let mut conn = self.lock()?;
        let mut written = 0usize;

        for batch in entries.chunks(UPSERT_BATCH_SIZE) {
            let result = write_batch(&mut conn, batch);
            match result {
                Ok(()) => written += batch.len(),
                Err(message) => {
                    // Remaining batches are abandoned; the caller learns how
                    // far the write got.
                    return Err(AppError::IndexWriteFailed { written, message });
                }
            }
        }

        tracing::debug!("Upserted {} entries", written);
        Ok(written)
    }

    fn query(&self, vector: &[f32], top_k: usize) -> AppResult<RetrievalResult> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT id, vector, text FROM chunks ORDER BY rowid")
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let vector_bytes: Vec<u8> = row.get(1)?;
                let text: String = row.get(2)?;
                Ok((id, vector_bytes, text))
            })
            .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

        let mut matches: Vec<ScoredChunk> = Vec::new();
        for row in rows {
            let (id, vector_bytes, text) =
                row.map_err(|e| AppError::Index(format!("Failed to read row: {}", e)))?;

            let entry_vector = bytes_to_vector(&vector_bytes)?;
            let id: ChunkId = id.parse()?;

            matches.push(ScoredChunk {
                id,
                text,
                score: cosine_similarity(vector, &entry_vector),
            });
        }

        // Stable sort keeps insertion (rowid) order on equal scores
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);

        tracing::debug!("Retrieved {} chunks (requested top-{})", matches.len(), top_k);

        Ok(RetrievalResult { matches })
    }

    fn len(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| AppError::Index(format!("Failed to count chunks: {}", e)))?;
        Ok(count as usize)
    }
}

/// Write one batch inside a transaction. Returns the failure message on
/// error so the caller can attach the running count.
fn write_batch(conn: &mut Connection, batch: &[IndexEntry]) -> Result<(), String> {
    let tx = conn
        .transaction()
        .map_err(|e| format!("Failed to start transaction: {}", e))?;

    for entry in batch {
        tx.execute(
            "INSERT OR REPLACE INTO chunks (id, vector, text) VALUES (?1, ?2, ?3)",
            params![
                entry.id.to_string(),
                vector_to_bytes(&entry.vector),
                entry.text,
            ],
        )
        .map_err(|e| format!("Failed to write entry {}: {}", entry.id, e))?;
    }

    tx.commit().map_err(|e| format!("Failed to commit batch: {}", e))
}

/// Convert an embedding vector to bytes for storage.
fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_vector(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index("Invalid vector bytes length".to_string()));
    }

    let mut vector = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        vector.push(value);
    }

    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn entry(id: ChunkId, vector: Vec<f32>, text: &str) -> IndexEntry {
        IndexEntry {
            id,
            vector,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_open_creates_schema() {
        let temp_file = NamedTempFile::new().unwrap();
        let index = SqliteIndex::open(temp_file.path()).unwrap();
        assert!(index.is_empty().unwrap());
    }

    #[test]
    fn test_upsert_and_query() {
        let temp_file = NamedTempFile::new().unwrap();
        let index = SqliteIndex::open(temp_file.path()).unwrap();

        index
            .upsert(&[
                entry(ChunkId::Handbook(0), vec![1.0, 0.0, 0.0], "exam rules"),
                entry(ChunkId::Handbook(1), vec![0.0, 1.0, 0.0], "hostel rules"),
            ])
            .unwrap();

        let result = index.query(&[1.0, 0.0, 0.0], 5).unwrap();
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].id, ChunkId::Handbook(0));
        assert_eq!(result.matches[0].text, "exam rules");
        assert!((result.matches[0].score - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_upsert_idempotent() {
        let temp_file = NamedTempFile::new().unwrap();
        let index = SqliteIndex::open(temp_file.path()).unwrap();

        let entries = vec![
            entry(ChunkId::Handbook(0), vec![1.0, 0.0], "v1"),
            entry(ChunkId::Handbook(1), vec![0.0, 1.0], "other"),
        ];

        index.upsert(&entries).unwrap();
        index.upsert(&entries).unwrap();
        assert_eq!(index.len().unwrap(), 2);

        // Re-upserting an id overwrites the payload
        index
            .upsert(&[entry(ChunkId::Handbook(0), vec![1.0, 0.0], "v2")])
            .unwrap();
        assert_eq!(index.len().unwrap(), 2);

        let result = index.query(&[1.0, 0.0], 1).unwrap();
        assert_eq!(result.matches[0].text, "v2");
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let temp_file = NamedTempFile::new().unwrap();
        let index = SqliteIndex::open(temp_file.path()).unwrap();

        index
            .upsert(&[
                entry(ChunkId::Handbook(7), vec![1.0, 0.0], "handbook seven"),
                entry(ChunkId::Web(7), vec![1.0, 0.0], "web seven"),
            ])
            .unwrap();

        assert_eq!(index.len().unwrap(), 2);
    }

    #[test]
    fn test_query_descending_order_and_top_k() {
        let temp_file = NamedTempFile::new().unwrap();
        let index = SqliteIndex::open(temp_file.path()).unwrap();

        index
            .upsert(&[
                entry(ChunkId::Handbook(0), vec![0.2, 1.0], "weak"),
                entry(ChunkId::Handbook(1), vec![1.0, 0.0], "exact"),
                entry(ChunkId::Handbook(2), vec![1.0, 0.4], "close"),
            ])
            .unwrap();

        let result = index.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].text, "exact");
        assert_eq!(result.matches[1].text, "close");
        assert!(result.matches[0].score >= result.matches[1].score);
    }

    #[test]
    fn test_tie_break_by_insertion_order() {
        let temp_file = NamedTempFile::new().unwrap();
        let index = SqliteIndex::open(temp_file.path()).unwrap();

        // Identical vectors: identical scores
        index
            .upsert(&[
                entry(ChunkId::Handbook(5), vec![1.0, 0.0], "first in"),
                entry(ChunkId::Handbook(2), vec![1.0, 0.0], "second in"),
            ])
            .unwrap();

        let result = index.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(result.matches[0].text, "first in");
        assert_eq!(result.matches[1].text, "second in");
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_file = NamedTempFile::new().unwrap();

        {
            let index = SqliteIndex::open(temp_file.path()).unwrap();
            index
                .upsert(&[entry(ChunkId::Handbook(0), vec![1.0], "durable")])
                .unwrap();
        }

        let reopened = SqliteIndex::open(temp_file.path()).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
        assert!(!reopened.is_empty().unwrap());
    }

    #[test]
    fn test_upsert_larger_than_one_batch() {
        let temp_file = NamedTempFile::new().unwrap();
        let index = SqliteIndex::open(temp_file.path()).unwrap();

        let entries: Vec<IndexEntry> = (0..(UPSERT_BATCH_SIZE as u64 * 2 + 10))
            .map(|i| entry(ChunkId::Handbook(i), vec![i as f32, 1.0], "bulk"))
            .collect();

        let written = index.upsert(&entries).unwrap();
        assert_eq!(written, entries.len());
        assert_eq!(index.len().unwrap(), entries.len());
    }

    #[test]
    fn test_vector_byte_round_trip() {
        let vector = vec![0.25f32, -1.5, 3.25, 0.0];
        let bytes = vector_to_bytes(&vector);
        assert_eq!(bytes_to_vector(&bytes).unwrap(), vector);
    }

    #[test]
    fn test_bad_vector_bytes_rejected() {
        assert!(bytes_to_vector(&[1, 2, 3]).is_err());
    }
}
