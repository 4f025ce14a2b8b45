//! Command handlers for the handbook CLI.

pub mod ask;
pub mod chat;
pub mod seed;
pub mod stats;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use seed::SeedCommand;
pub use stats::StatsCommand;

use handbook_core::{AppConfig, AppResult};
use handbook_knowledge::embeddings::{self, EmbeddingClient};
use handbook_knowledge::index::{SqliteIndex, VectorIndex};
use handbook_knowledge::rag::{Pipeline, RetrievalPolicy};
use handbook_websearch::{SearchProvider, SerpApiClient};
use std::sync::Arc;

/// Build the embedding client for the configured provider.
///
/// The trigram provider runs keyless; everything else resolves its
/// credential here and fails fast when it is missing.
pub fn build_embedder(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingClient>> {
    let api_key = if config.embedding.provider == "trigram" {
        None
    } else {
        Some(config.resolve_api_key(&config.embedding.api_key_env)?)
    };

    embeddings::create_client(&config.embedding, api_key.as_deref())
}

/// Open the persistent vector index.
pub fn open_index(config: &AppConfig) -> AppResult<Arc<dyn VectorIndex>> {
    Ok(Arc::new(SqliteIndex::open(&config.index_path)?))
}

/// Build the full answering pipeline from configuration.
///
/// Resolves every provider credential up front — a missing key stops the
/// command before any query is taken.
pub fn build_pipeline(config: &AppConfig) -> AppResult<Pipeline> {
    let embedder = build_embedder(config)?;
    let index = open_index(config)?;

    let search_key = config.resolve_api_key(&config.search.api_key_env)?;
    let search: Arc<dyn SearchProvider> = Arc::new(match config.search.endpoint.as_deref() {
        Some(endpoint) => SerpApiClient::with_endpoint(
            search_key,
            endpoint,
            config.search.max_pages,
            config.search.page_timeout_secs,
        )?,
        None => SerpApiClient::new(
            search_key,
            config.search.max_pages,
            config.search.page_timeout_secs,
        )?,
    });

    let generation_key = config.resolve_api_key(&config.generation.api_key_env)?;
    let llm = handbook_llm::create_client(
        &config.generation.provider,
        config.generation.endpoint.as_deref(),
        Some(&generation_key),
    )?;

    let policy = RetrievalPolicy::from_settings(&config.retrieval, &config.search);

    Ok(Pipeline::new(
        embedder,
        index,
        search,
        llm,
        policy,
        config.generation.model.clone(),
    ))
}
