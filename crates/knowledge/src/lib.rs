//! Knowledge base for the handbook agent.
//!
//! Holds the retrieval side of the system: chunking, embedding providers,
//! the persistent vector index, web-content ingestion, and the
//! retrieval-escalation pipeline that decides — per query — whether an
//! answer comes from the corpus, a scoped web search, a general web search,
//! or general knowledge.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod rag;
pub mod types;

// Re-export commonly used types
pub use types::{ChunkId, IndexEntry, RetrievalResult, ScoredChunk};

use embeddings::EmbeddingClient;
use handbook_core::{AppError, AppResult};
use index::VectorIndex;

/// Bulk-load the base corpus into the index.
///
/// The chunks arrive pre-split at target granularity from the corpus
/// loader. Seeding runs once: if the index already holds any entries the
/// call is a no-op, because corpus ingestion is all-or-nothing and only
/// ever attempted once. Returns the number of entries written (0 when
/// skipped).
pub async fn seed_corpus(
    chunks: &[String],
    embedder: &dyn EmbeddingClient,
    index: &dyn VectorIndex,
    batch_size: usize,
) -> AppResult<usize> {
    if !index.is_empty()? {
        tracing::info!(
            "Index already holds {} entries; skipping corpus seeding",
            index.len()?
        );
        return Ok(0);
    }

    tracing::info!("Seeding corpus: {} chunks", chunks.len());

    let batch_size = batch_size.max(1);
    let mut written = 0usize;

    for batch in chunks.chunks(batch_size) {
        let vectors = embedder.embed_documents(batch).await?;

        let entries: Vec<types::IndexEntry> = batch
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (text, vector))| types::IndexEntry {
                id: types::ChunkId::Handbook((written + i) as u64),
                vector,
                text: text.clone(),
            })
            .collect();

        match index.upsert(&entries) {
            Ok(count) => written += count,
            Err(AppError::IndexWriteFailed {
                written: batch_written,
                message,
            }) => {
                // Report progress across all batches, not just the last one
                return Err(AppError::IndexWriteFailed {
                    written: written + batch_written,
                    message,
                });
            }
            Err(e) => return Err(e),
        }

        tracing::debug!("Seeded {}/{} chunks", written, chunks.len());
    }

    tracing::info!("Corpus seeded: {} entries", written);
    Ok(written)
}
