//! Web search crate for the handbook agent.
//!
//! Provides the search-provider abstraction used by the retrieval
//! escalator's fallback tiers, a SerpApi implementation, and the page
//! scraping helpers that turn result links into readable text.
//!
//! "No results" is a normal outcome, not an error; only an unreachable
//! search backend is reported as a failure, and callers are expected to
//! degrade that to an empty result set.

pub mod provider;
pub mod scrape;
pub mod serpapi;

pub use provider::{SearchHit, SearchProvider};
pub use scrape::extract_readable_text;
pub use serpapi::SerpApiClient;
