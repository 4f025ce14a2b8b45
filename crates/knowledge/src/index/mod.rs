//! Vector index abstraction for knowledge chunks.
//!
//! The index is a dumb nearest-neighbour service: it stores
//! `id -> (vector, text)` and answers top-k cosine queries. Relevance
//! thresholds are applied by the caller, not here. Methods take `&self` with
//! interior synchronisation because queries and web-content ingestion run
//! concurrently; disjoint id namespaces keep concurrent writers from
//! colliding on keys.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

use crate::types::{IndexEntry, RetrievalResult};
use handbook_core::AppResult;

/// Entries per write batch; matches the embedding provider payload limit.
pub const UPSERT_BATCH_SIZE: usize = 96;

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Insert or update entries, idempotent per id.
    ///
    /// Writes happen in batches of [`UPSERT_BATCH_SIZE`]; a failing batch
    /// aborts the remaining ones and surfaces
    /// `AppError::IndexWriteFailed { written, .. }` carrying the number of
    /// entries persisted before the failure. Returns the total written on
    /// success.
    fn upsert(&self, entries: &[IndexEntry]) -> AppResult<usize>;

    /// Return up to `top_k` entries nearest to `vector` by cosine
    /// similarity, descending, ties broken by insertion order.
    fn query(&self, vector: &[f32], top_k: usize) -> AppResult<RetrievalResult>;

    /// Number of entries in the index.
    fn len(&self) -> AppResult<usize>;

    /// Whether the index holds no entries. Used once at startup to decide
    /// whether the base corpus needs bulk ingestion.
    fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Calculate cosine similarity between two vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
