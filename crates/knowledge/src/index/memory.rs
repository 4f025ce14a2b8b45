//! In-memory vector index.
//!
//! Same contract as the SQLite backend without durability. Used by tests
//! and as an ephemeral store when no index path is configured.

use crate::index::{cosine_similarity, VectorIndex, UPSERT_BATCH_SIZE};
use crate::types::{IndexEntry, RetrievalResult, ScoredChunk};
use handbook_core::{AppError, AppResult};
use std::sync::RwLock;

/// Ephemeral vector index backed by a Vec in insertion order.
#[derive(Default)]
pub struct MemoryIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorIndex for MemoryIndex {
    fn upsert(&self, entries: &[IndexEntry]) -> AppResult<usize> {
        let mut store = self
            .entries
            .write()
            .map_err(|_| AppError::Index("Index lock poisoned".to_string()))?;

        let mut written = 0usize;
        for batch in entries.chunks(UPSERT_BATCH_SIZE) {
            for entry in batch {
                match store.iter_mut().find(|e| e.id == entry.id) {
                    // Overwrite in place, keeping the original insertion slot
                    Some(existing) => *existing = entry.clone(),
                    None => store.push(entry.clone()),
                }
            }
            written += batch.len();
        }

        Ok(written)
    }

    fn query(&self, vector: &[f32], top_k: usize) -> AppResult<RetrievalResult> {
        let store = self
            .entries
            .read()
            .map_err(|_| AppError::Index("Index lock poisoned".to_string()))?;

        let mut matches: Vec<ScoredChunk> = store
            .iter()
            .map(|entry| ScoredChunk {
                id: entry.id,
                text: entry.text.clone(),
                score: cosine_similarity(vector, &entry.vector),
            })
            .collect();

        // Stable sort keeps insertion order on equal scores
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);

        Ok(RetrievalResult { matches })
    }

    fn len(&self) -> AppResult<usize> {
        let store = self
            .entries
            .read()
            .map_err(|_| AppError::Index("Index lock poisoned".to_string()))?;
        Ok(store.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkId;

    fn entry(id: ChunkId, vector: Vec<f32>, text: &str) -> IndexEntry {
        IndexEntry {
            id,
            vector,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_empty_index() {
        let index = MemoryIndex::new();
        assert!(index.is_empty().unwrap());
        assert!(index.query(&[1.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_idempotent() {
        let index = MemoryIndex::new();
        let entries = vec![entry(ChunkId::Handbook(0), vec![1.0, 0.0], "once")];

        index.upsert(&entries).unwrap();
        index.upsert(&entries).unwrap();

        assert_eq!(index.len().unwrap(), 1);
    }

    #[test]
    fn test_overwrite_keeps_latest_payload() {
        let index = MemoryIndex::new();

        index
            .upsert(&[entry(ChunkId::Web(1), vec![1.0, 0.0], "old")])
            .unwrap();
        index
            .upsert(&[entry(ChunkId::Web(1), vec![0.0, 1.0], "new")])
            .unwrap();

        let result = index.query(&[0.0, 1.0], 1).unwrap();
        assert_eq!(result.matches[0].text, "new");
        assert!((result.matches[0].score - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_query_order_and_tie_break() {
        let index = MemoryIndex::new();

        index
            .upsert(&[
                entry(ChunkId::Handbook(0), vec![0.0, 1.0], "far"),
                entry(ChunkId::Handbook(1), vec![1.0, 0.0], "tied first"),
                entry(ChunkId::Handbook(2), vec![1.0, 0.0], "tied second"),
            ])
            .unwrap();

        let result = index.query(&[1.0, 0.0], 3).unwrap();
        assert_eq!(result.matches[0].text, "tied first");
        assert_eq!(result.matches[1].text, "tied second");
        assert_eq!(result.matches[2].text, "far");
    }
}
