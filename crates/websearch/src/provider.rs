//! Web search provider abstraction.

use handbook_core::AppResult;
use serde::{Deserialize, Serialize};

/// One search result with its extracted page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page URL
    pub url: String,

    /// Result title, when the backend reports one
    pub title: Option<String>,

    /// Extracted page text (or the result snippet when the page could not
    /// be fetched)
    pub text: String,
}

/// Trait for web search backends.
///
/// `scope` restricts results to a single domain; `None` means an
/// unrestricted search. An empty result list is a normal outcome and is
/// returned as `Ok(vec![])` — only failure to reach the search backend
/// itself surfaces `AppError::SearchUnavailable`. Failures fetching
/// individual result pages are never fatal; the page is skipped.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Get the provider name (e.g., "serpapi").
    fn provider_name(&self) -> &str;

    /// Search the web, optionally scoped to one domain.
    async fn search(&self, query: &str, scope: Option<&str>) -> AppResult<Vec<SearchHit>>;
}
