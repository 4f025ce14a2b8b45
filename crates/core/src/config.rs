//! Configuration management for the handbook agent.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Built-in defaults
//! - Config file (handbook.yaml)
//! - Environment variables
//! - Command-line flags (applied by the caller via [`AppConfig::with_overrides`])
//!
//! Credentials are never stored in the config file; the file names the
//! environment variable each provider reads its key from, and
//! [`AppConfig::resolve_api_key`] performs the lookup. A missing credential
//! for an active remote provider is a fatal startup error.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Path to the persistent vector index database
    pub index_path: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Generation (LLM) provider settings
    pub generation: GenerationSettings,

    /// Web search provider settings
    pub search: SearchSettings,

    /// Retrieval policy settings
    pub retrieval: RetrievalSettings,
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name ("cohere" or "trigram")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Embedding vector dimension
    pub dimensions: usize,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Optional custom endpoint
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_embed_timeout")]
    pub timeout_secs: u64,

    /// Upsert batch size (provider payload limit)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Generation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Provider name ("groq")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Optional custom endpoint
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

/// Web search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Provider name ("serpapi")
    pub provider: String,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Optional custom endpoint
    pub endpoint: Option<String>,

    /// Trusted institutional domain for scoped search
    #[serde(rename = "scopeDomain")]
    pub scope_domain: String,

    /// How many result pages to fetch and scrape per search
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-page fetch timeout in seconds
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,
}

/// Retrieval policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of nearest neighbours to fetch per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum cosine similarity for a corpus match to count.
    /// 0.6 trusts only strong matches; lower values (e.g. 0.3) trade
    /// precision for recall.
    #[serde(rename = "similarityThreshold", default = "default_threshold")]
    pub similarity_threshold: f32,

    /// Cap on general-web context passed to the prompt, in characters
    #[serde(rename = "maxWebContextChars", default = "default_web_context_cap")]
    pub max_web_context_chars: usize,

    /// Chunk size in characters for corpus and web ingestion
    #[serde(rename = "chunkSize", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(rename = "chunkOverlap", default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_embed_timeout() -> u64 {
    60
}

fn default_generation_timeout() -> u64 {
    60
}

fn default_batch_size() -> usize {
    96
}

fn default_max_pages() -> usize {
    2
}

fn default_page_timeout() -> u64 {
    10
}

fn default_top_k() -> usize {
    5
}

fn default_threshold() -> f32 {
    0.6
}

fn default_web_context_cap() -> usize {
    4000
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

/// Partial configuration file structure; every section is optional so a
/// config file only has to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    index: Option<IndexSection>,
    logging: Option<LoggingSection>,
    embedding: Option<EmbeddingSettings>,
    generation: Option<GenerationSettings>,
    search: Option<SearchSettings>,
    retrieval: Option<RetrievalSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            index_path: PathBuf::from("handbook.db"),
            log_level: None,
            verbose: false,
            no_color: false,
            embedding: EmbeddingSettings {
                provider: "cohere".to_string(),
                model: "embed-english-v3.0".to_string(),
                dimensions: 1024,
                api_key_env: "COHERE_API_KEY".to_string(),
                endpoint: None,
                timeout_secs: default_embed_timeout(),
                batch_size: default_batch_size(),
            },
            generation: GenerationSettings {
                provider: "groq".to_string(),
                model: "llama3-8b-8192".to_string(),
                api_key_env: "GROQ_API_KEY".to_string(),
                endpoint: None,
                timeout_secs: default_generation_timeout(),
            },
            search: SearchSettings {
                provider: "serpapi".to_string(),
                api_key_env: "SERPAPI_API_KEY".to_string(),
                endpoint: None,
                scope_domain: "christuniversity.in".to_string(),
                max_pages: default_max_pages(),
                page_timeout_secs: default_page_timeout(),
            },
            retrieval: RetrievalSettings {
                top_k: default_top_k(),
                similarity_threshold: default_threshold(),
                max_web_context_chars: default_web_context_cap(),
                chunk_size: default_chunk_size(),
                chunk_overlap: default_chunk_overlap(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file, and environment
    /// variables.
    ///
    /// Environment variables:
    /// - `HANDBOOK_CONFIG`: path to config file (default: ./handbook.yaml)
    /// - `HANDBOOK_INDEX`: override index database path
    /// - `HANDBOOK_SCOPE_DOMAIN`: override the trusted search domain
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("HANDBOOK_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("handbook.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the config file
        if let Ok(index) = std::env::var("HANDBOOK_INDEX") {
            config.index_path = PathBuf::from(index);
        }

        if let Ok(domain) = std::env::var("HANDBOOK_SCOPE_DOMAIN") {
            config.search.scope_domain = domain;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(index) = config_file.index {
            if let Some(path) = index.path {
                result.index_path = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        Ok(result)
    }

    /// Apply CLI overrides, giving flags precedence over the file and
    /// environment.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        index_path: Option<PathBuf>,
        threshold: Option<f32>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(index_path) = index_path {
            self.index_path = index_path;
        }

        if let Some(threshold) = threshold {
            self.retrieval.similarity_threshold = threshold;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve an API key from the environment variable named in config.
    ///
    /// A missing credential is an immediate `Config` error, not a retryable
    /// condition.
    pub fn resolve_api_key(&self, env_var: &str) -> AppResult<String> {
        std::env::var(env_var).map_err(|_| {
            AppError::Config(format!(
                "API key not found in environment variable: {}",
                env_var
            ))
        })
    }

    /// Validate configuration for the active providers.
    ///
    /// Checks that provider names are known and that each remote provider's
    /// credential is present. Called once at startup; failures are fatal.
    pub fn validate(&self) -> AppResult<()> {
        let known_embedding = ["cohere", "trigram"];
        if !known_embedding.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embedding.join(", ")
            )));
        }

        let known_generation = ["groq"];
        if !known_generation.contains(&self.generation.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown generation provider: {}. Supported: {}",
                self.generation.provider,
                known_generation.join(", ")
            )));
        }

        let known_search = ["serpapi"];
        if !known_search.contains(&self.search.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search provider: {}. Supported: {}",
                self.search.provider,
                known_search.join(", ")
            )));
        }

        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                self.retrieval.chunk_overlap, self.retrieval.chunk_size
            )));
        }

        // The trigram embedder runs offline; every other provider needs its
        // credential resolvable now rather than mid-request.
        if self.embedding.provider != "trigram" {
            self.resolve_api_key(&self.embedding.api_key_env)?;
        }
        self.resolve_api_key(&self.generation.api_key_env)?;
        self.resolve_api_key(&self.search.api_key_env)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.embedding.provider, "cohere");
        assert_eq!(config.embedding.dimensions, 1024);
        assert_eq!(config.generation.model, "llama3-8b-8192");
        assert_eq!(config.retrieval.top_k, 5);
        assert!((config.retrieval.similarity_threshold - 0.6).abs() < f32::EPSILON);
        assert!(!config.verbose);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some(PathBuf::from("/tmp/other.db")),
            Some(0.3),
            None,
            true,
            false,
        );

        assert_eq!(overridden.index_path, PathBuf::from("/tmp/other.db"));
        assert!((overridden.retrieval.similarity_threshold - 0.3).abs() < f32::EPSILON);
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_bounds() {
        let mut config = AppConfig::default();
        config.retrieval.chunk_size = 100;
        config.retrieval.chunk_overlap = 100;

        let err = match config.validate() {
            Err(e) => e.to_string(),
            Ok(_) => panic!("expected validation failure"),
        };
        assert!(err.contains("chunkOverlap"));
    }

    #[test]
    fn test_resolve_api_key_missing() {
        let config = AppConfig::default();
        let result = config.resolve_api_key("HANDBOOK_TEST_KEY_THAT_DOES_NOT_EXIST");
        assert!(result.is_err());
    }
}
