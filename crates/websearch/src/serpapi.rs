//! SerpApi search provider.
//!
//! Queries the SerpApi Google engine, then fetches and scrapes the top
//! organic results so downstream consumers receive page text rather than
//! bare links. Domain scoping uses `site:` query syntax.

use crate::provider::{SearchHit, SearchProvider};
use crate::scrape;
use handbook_core::{AppError, AppResult};
use serde::Deserialize;
use std::time::Duration;

/// Default SerpApi endpoint.
const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// SerpApi response envelope; only organic results are consumed.
#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

/// SerpApi Google-engine search client.
pub struct SerpApiClient {
    /// API endpoint
    endpoint: String,

    /// API credential
    api_key: String,

    /// How many result pages to fetch and scrape
    max_pages: usize,

    /// HTTP client (carries the per-page fetch timeout)
    client: reqwest::Client,
}

impl SerpApiClient {
    /// Create a new client with the default endpoint.
    pub fn new(api_key: impl Into<String>, max_pages: usize, page_timeout_secs: u64) -> AppResult<Self> {
        Self::with_endpoint(api_key, DEFAULT_SERPAPI_URL, max_pages, page_timeout_secs)
    }

    /// Create a new client with a custom endpoint.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        max_pages: usize,
        page_timeout_secs: u64,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(page_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::SearchUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            max_pages,
            client,
        })
    }

    /// Build the effective query string, applying `site:` scoping.
    fn effective_query(query: &str, scope: Option<&str>) -> String {
        match scope {
            Some(domain) => format!("site:{} {}", domain, query),
            None => query.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for SerpApiClient {
    fn provider_name(&self) -> &str {
        "serpapi"
    }

    async fn search(&self, query: &str, scope: Option<&str>) -> AppResult<Vec<SearchHit>> {
        let effective = Self::effective_query(query, scope);
        tracing::info!("Web search: '{}'", effective);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "google"),
                ("q", effective.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::SearchUnavailable(format!("Failed to reach search backend: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::SearchUnavailable(format!(
                "Search backend error ({}): {}",
                status, error_text
            )));
        }

        let parsed: SerpApiResponse = response.json().await.map_err(|e| {
            AppError::SearchUnavailable(format!("Failed to parse search response: {}", e))
        })?;

        if parsed.organic_results.is_empty() {
            tracing::info!("No results for '{}'", effective);
            return Ok(Vec::new());
        }

        // Fetch and scrape the top results. A failed page fetch is skipped;
        // the result snippet stands in when one exists.
        let mut hits = Vec::new();
        for result in parsed.organic_results.into_iter().take(self.max_pages) {
            let Some(url) = result.link else {
                continue;
            };

            match scrape::fetch_page_text(&self.client, &url).await {
                Ok(text) if !text.is_empty() => {
                    hits.push(SearchHit {
                        text: format!("--- Content from {} ---\n{}", url, text),
                        title: result.title,
                        url,
                    });
                }
                Ok(_) => {
                    tracing::debug!("Page {} yielded no readable text", url);
                    if let Some(snippet) = result.snippet {
                        hits.push(SearchHit {
                            text: format!("--- Content from {} ---\n{}", url, snippet),
                            title: result.title,
                            url,
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping page {}: {}", url, e);
                    if let Some(snippet) = result.snippet {
                        hits.push(SearchHit {
                            text: format!("--- Content from {} ---\n{}", url, snippet),
                            title: result.title,
                            url,
                        });
                    }
                }
            }
        }

        tracing::info!("Search produced {} usable hits", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_query_scoped() {
        let q = SerpApiClient::effective_query("hostel curfew", Some("christuniversity.in"));
        assert_eq!(q, "site:christuniversity.in hostel curfew");
    }

    #[test]
    fn test_effective_query_unscoped() {
        let q = SerpApiClient::effective_query("hostel curfew", None);
        assert_eq!(q, "hostel curfew");
    }

    #[test]
    fn test_parse_organic_results() {
        let body = r#"{
            "organic_results": [
                {"title": "Fee Structure", "link": "https://example.edu/fees", "snippet": "Fees are due in June."},
                {"link": "https://example.edu/other"}
            ],
            "search_metadata": {"status": "Success"}
        }"#;

        let parsed: SerpApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.organic_results.len(), 2);
        assert_eq!(parsed.organic_results[0].title.as_deref(), Some("Fee Structure"));
        assert!(parsed.organic_results[1].snippet.is_none());
    }

    #[test]
    fn test_parse_empty_response() {
        let parsed: SerpApiResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.organic_results.is_empty());
    }
}
