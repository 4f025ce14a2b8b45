//! LLM provider factory.
//!
//! Creates generation clients from the application configuration: provider
//! name resolution, credential injection, endpoint override.

use crate::client::LlmClient;
use crate::providers::GroqClient;
use handbook_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier (currently "groq")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for all remote providers)
///
/// # Errors
/// Returns `Config` errors for unknown providers or missing credentials —
/// these are fatal at startup, not retryable per-request conditions.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "groq" => {
            let api_key = api_key
                .ok_or_else(|| AppError::Config("Groq provider requires an API key".to_string()))?;

            let client = match endpoint {
                Some(endpoint) => GroqClient::with_base_url(api_key, endpoint)?,
                None => GroqClient::new(api_key)?,
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown generation provider: {}",
            provider
        ))),
    }
}
