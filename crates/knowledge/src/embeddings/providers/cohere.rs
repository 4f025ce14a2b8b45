//! Cohere embedding provider.
//!
//! Calls the Cohere v1 embed API. The API distinguishes document and query
//! embeddings via `input_type` (`search_document` / `search_query`); both
//! entry points of [`EmbeddingClient`] map onto that field.

use crate::embeddings::{EmbeddingClient, InputType};
use async_trait::async_trait;
use handbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Cohere API base URL.
const DEFAULT_COHERE_URL: &str = "https://api.cohere.com/v1";

/// Request payload for the embed endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'static str,
}

/// Response from the embed endpoint.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Cohere embedding client.
#[derive(Debug, Clone)]
pub struct CohereClient {
    /// HTTP client carrying the request timeout
    client: reqwest::Client,
    /// API base URL
    base_url: String,
    /// Bearer credential
    api_key: String,
    /// Model name (e.g., "embed-english-v3.0")
    model: String,
    /// Expected embedding dimensions
    dimensions: usize,
}

impl CohereClient {
    /// Create a new Cohere client.
    ///
    /// # Errors
    /// `EmbeddingUnavailable` if the HTTP client cannot be constructed.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        endpoint: Option<&str>,
        timeout_secs: u64,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                AppError::EmbeddingUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: endpoint.unwrap_or(DEFAULT_COHERE_URL).to_string(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
        })
    }

    fn input_type_field(input_type: InputType) -> &'static str {
        match input_type {
            InputType::Document => "search_document",
            InputType::Query => "search_query",
        }
    }
}

#[async_trait]
impl EmbeddingClient for CohereClient {
    fn provider_name(&self) -> &str {
        "cohere"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[String], input_type: InputType) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/embed", self.base_url);
        let request = EmbedRequest {
            texts,
            model: &self.model,
            input_type: Self::input_type_field(input_type),
        };

        debug!(
            "Embedding {} texts ({:?} mode) via {}",
            texts.len(),
            input_type,
            url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::EmbeddingUnavailable(format!("Failed to reach Cohere: {}", e))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(AppError::EmbeddingUnavailable(format!(
                    "Cohere API error ({}): {}",
                    status, error_response.message
                )));
            }

            return Err(AppError::EmbeddingUnavailable(format!(
                "Cohere API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingUnavailable(format!("Failed to parse Cohere response: {}", e))
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "Cohere returned {} embeddings for {} texts",
                body.embeddings.len(),
                texts.len()
            )));
        }

        for embedding in &body.embeddings {
            if embedding.len() != self.dimensions {
                return Err(AppError::EmbeddingUnavailable(format!(
                    "Unexpected embedding dimensions: got {}, expected {}",
                    embedding.len(),
                    self.dimensions
                )));
            }
        }

        debug!("Received {} embeddings", body.embeddings.len());

        Ok(body.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CohereClient::new("key", "embed-english-v3.0", 1024, None, 60).unwrap();
        assert_eq!(client.provider_name(), "cohere");
        assert_eq!(client.model_name(), "embed-english-v3.0");
        assert_eq!(client.dimensions(), 1024);
        assert_eq!(client.base_url, DEFAULT_COHERE_URL);
    }

    #[test]
    fn test_custom_endpoint() {
        let client =
            CohereClient::new("key", "m", 1024, Some("http://localhost:9000/v1"), 60).unwrap();
        assert_eq!(client.base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn test_input_type_mapping() {
        assert_eq!(
            CohereClient::input_type_field(InputType::Document),
            "search_document"
        );
        assert_eq!(
            CohereClient::input_type_field(InputType::Query),
            "search_query"
        );
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let client = CohereClient::new("key", "m", 1024, None, 60).unwrap();
        let result = client.embed(&[], InputType::Document).await.unwrap();
        assert!(result.is_empty());
    }
}
