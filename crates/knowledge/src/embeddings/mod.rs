//! Embedding client trait and factory.
//!
//! Document indexing and query embedding are separate entry points carrying
//! distinct input modes. Models with asymmetric embeddings produce different
//! vectors for the two modes, and mixing them up degrades retrieval quality
//! silently — so the mode is part of the wire call, not a hint.

pub mod providers;

use handbook_core::config::EmbeddingSettings;
use handbook_core::{AppError, AppResult};
use std::sync::Arc;

/// Embedding input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Text being indexed as a document
    Document,

    /// Text being used as a search query
    Query,
}

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Get provider name (e.g., "cohere", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for a batch of texts in the given mode.
    async fn embed(&self, texts: &[String], input_type: InputType) -> AppResult<Vec<Vec<f32>>>;

    /// Embed texts for indexing (document mode).
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.embed(texts, InputType::Document).await
    }

    /// Embed a single search query (query mode).
    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed(&[text.to_string()], InputType::Query).await?;
        results.pop().ok_or_else(|| {
            AppError::EmbeddingUnavailable("No embedding returned for query".to_string())
        })
    }
}

/// Create an embedding client based on configuration.
///
/// The trigram provider runs offline and needs no credential; every remote
/// provider fails here — fatally — when its key is absent.
pub fn create_client(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingClient>> {
    match settings.provider.as_str() {
        "cohere" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::EmbeddingUnavailable(
                    "Cohere provider requires an API key".to_string(),
                )
            })?;
            let client = providers::cohere::CohereClient::new(
                api_key,
                &settings.model,
                settings.dimensions,
                settings.endpoint.as_deref(),
                settings.timeout_secs,
            )?;
            Ok(Arc::new(client))
        }

        "trigram" => {
            let client = providers::trigram::TrigramClient::new(settings.dimensions);
            Ok(Arc::new(client))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: cohere, trigram",
            settings.provider
        ))),
    }
}
