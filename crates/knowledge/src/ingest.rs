//! Web-content ingestion.
//!
//! Converts freshly scraped text into index entries through the same
//! chunk-then-embed path the corpus loader uses, so future similar queries
//! are answered from the corpus tier directly. Entries land in the `Web` id
//! namespace with a counter seeded from the current index size, which keeps
//! them disjoint from handbook ids and from earlier ingestions.

use crate::chunker::chunk_text;
use crate::embeddings::EmbeddingClient;
use crate::index::VectorIndex;
use crate::types::{ChunkId, IndexEntry};
use handbook_core::AppResult;

/// Chunk, embed (document mode), and upsert scraped web text.
///
/// Returns the number of entries written. Errors — embedding failures or a
/// partial index write — propagate to the caller, which decides whether
/// they block the surrounding answer (during escalation they do not).
pub async fn ingest_web_content(
    text: &str,
    embedder: &dyn EmbeddingClient,
    index: &dyn VectorIndex,
    chunk_size: usize,
    chunk_overlap: usize,
) -> AppResult<usize> {
    let chunks: Vec<String> = chunk_text(text, chunk_size, chunk_overlap)
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .collect();

    if chunks.is_empty() {
        tracing::debug!("Nothing to ingest");
        return Ok(0);
    }

    tracing::info!("Ingesting {} chunks of web content", chunks.len());

    let vectors = embedder.embed_documents(&chunks).await?;

    let seed = index.len()? as u64;
    let entries: Vec<IndexEntry> = chunks
        .into_iter()
        .zip(vectors)
        .enumerate()
        .map(|(i, (text, vector))| IndexEntry {
            id: ChunkId::Web(seed + i as u64),
            vector,
            text,
        })
        .collect();

    let written = index.upsert(&entries)?;
    tracing::info!("Ingested {} web chunks into the index", written);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramClient;
    use crate::index::MemoryIndex;

    #[tokio::test]
    async fn test_ingest_creates_web_entries() {
        let embedder = TrigramClient::new(64);
        let index = MemoryIndex::new();

        let written = ingest_web_content(
            "Hostel fees are due by the first week of June every year.",
            &embedder,
            &index,
            1000,
            200,
        )
        .await
        .unwrap();

        assert_eq!(written, 1);
        assert_eq!(index.len().unwrap(), 1);

        let query = embedder.embed_query("hostel fees due").await.unwrap();
        let result = index.query(&query, 5).unwrap();
        assert!(result.matches[0].id.is_web());
    }

    #[tokio::test]
    async fn test_ingest_ids_seeded_from_index_size() {
        let embedder = TrigramClient::new(64);
        let index = MemoryIndex::new();

        ingest_web_content("First page of content.", &embedder, &index, 1000, 200)
            .await
            .unwrap();
        ingest_web_content("Second page of content.", &embedder, &index, 1000, 200)
            .await
            .unwrap();

        // Two ingestions, no id reuse
        assert_eq!(index.len().unwrap(), 2);

        let query = embedder.embed_query("page content").await.unwrap();
        let result = index.query(&query, 5).unwrap();
        let ids: Vec<String> = result.matches.iter().map(|m| m.id.to_string()).collect();
        assert!(ids.contains(&"web-0".to_string()));
        assert!(ids.contains(&"web-1".to_string()));
    }

    #[tokio::test]
    async fn test_ingest_empty_text_is_noop() {
        let embedder = TrigramClient::new(64);
        let index = MemoryIndex::new();

        let written = ingest_web_content("   \n  ", &embedder, &index, 1000, 200)
            .await
            .unwrap();

        assert_eq!(written, 0);
        assert!(index.is_empty().unwrap());
    }
}
