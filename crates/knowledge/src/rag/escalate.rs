//! The retrieval escalator.
//!
//! A state machine over a single query with four strictly ordered tiers,
//! stopping at the first one that yields usable context:
//!
//! 1. Corpus — vector search over the index, threshold-filtered
//! 2. Scoped web — search restricted to the trusted domain, with ingestion
//!    of whatever it finds back into the index
//! 3. General web — unrestricted search, capped context, no ingestion
//! 4. General knowledge — no context at all
//!
//! Exactly one tier's provenance is reported per query. A populated tier is
//! never overridden by a later one, and no tier is retried — the ladder
//! itself is the retry strategy. An unreachable search backend counts as
//! "no results"; only an embedding failure aborts the query.

use crate::chunker::truncate_at_boundary;
use crate::embeddings::EmbeddingClient;
use crate::index::VectorIndex;
use crate::ingest::ingest_web_content;
use crate::rag::types::{EscalatedContext, RetrievalPolicy};
use handbook_core::{AppError, AppResult};
use handbook_prompt::Provenance;
use handbook_websearch::{SearchHit, SearchProvider};

/// Run the escalation ladder for one query.
///
/// # Errors
/// `EmbeddingUnavailable` when the query cannot be embedded — there is no
/// useful degradation from that, so the request aborts. Search-backend
/// failures never surface here; they degrade to the next tier.
pub async fn escalate(
    query: &str,
    embedder: &dyn EmbeddingClient,
    index: &dyn VectorIndex,
    search: &dyn SearchProvider,
    policy: &RetrievalPolicy,
) -> AppResult<EscalatedContext> {
    // Tier 1: the pre-indexed corpus
    let query_vector = embedder.embed_query(query).await?;
    let matches = index
        .query(&query_vector, policy.top_k)?
        .above_threshold(policy.similarity_threshold);

    if !matches.is_empty() {
        tracing::info!(
            "Corpus tier hit: {} matches above threshold {:.2} (top score {:.3})",
            matches.matches.len(),
            policy.similarity_threshold,
            matches.matches[0].score
        );

        let context = matches
            .matches
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        return Ok(EscalatedContext {
            context: Some(context),
            provenance: Provenance::Corpus,
        });
    }

    tracing::info!(
        "Corpus tier miss (no match above {:.2}); escalating to {}",
        policy.similarity_threshold,
        policy.scope_domain
    );

    // Tier 2: search scoped to the trusted domain
    let hits = soft_search(search, query, Some(&policy.scope_domain)).await;
    let scoped_context = combine_hits(&hits);

    if !scoped_context.trim().is_empty() {
        tracing::info!("Scoped-web tier hit: {} pages", hits.len());

        // Grow the knowledge base so the next similar query stays local.
        // Persistence failure never blocks the answer — the scraped text is
        // already in hand.
        match ingest_web_content(
            &scoped_context,
            embedder,
            index,
            policy.chunk_size,
            policy.chunk_overlap,
        )
        .await
        {
            Ok(count) => tracing::info!("Knowledge base grew by {} chunks", count),
            Err(AppError::IndexWriteFailed { written, message }) => {
                tracing::warn!(
                    "Partial ingestion: {} chunks written before failure: {}",
                    written,
                    message
                );
            }
            Err(e) => tracing::warn!("Ingestion failed, answering anyway: {}", e),
        }

        return Ok(EscalatedContext {
            context: Some(scoped_context),
            provenance: Provenance::ScopedWeb,
        });
    }

    tracing::info!("Scoped-web tier miss; escalating to general web search");

    // Tier 3: unrestricted search. Content here is not institutionally
    // authoritative, so nothing is ingested.
    let hits = soft_search(search, query, None).await;
    let general_context = combine_hits(&hits);

    if !general_context.trim().is_empty() {
        tracing::info!("General-web tier hit: {} pages", hits.len());

        let capped = truncate_at_boundary(&general_context, policy.max_web_context_chars);

        return Ok(EscalatedContext {
            context: Some(capped.to_string()),
            provenance: Provenance::GeneralWeb,
        });
    }

    // Tier 4: nothing found anywhere
    tracing::info!("All retrieval tiers missed; answering from general knowledge");

    Ok(EscalatedContext {
        context: None,
        provenance: Provenance::GeneralKnowledge,
    })
}

/// Search with graceful degradation: an unreachable backend is logged and
/// treated as an empty result set rather than aborting the query.
async fn soft_search(
    search: &dyn SearchProvider,
    query: &str,
    scope: Option<&str>,
) -> Vec<SearchHit> {
    match search.search(query, scope).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::warn!("Search unavailable, treating as no results: {}", e);
            Vec::new()
        }
    }
}

/// Join hit texts into one context block.
fn combine_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
