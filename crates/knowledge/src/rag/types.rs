//! Retrieval and answer types.

use handbook_core::config::{RetrievalSettings, SearchSettings};
use handbook_prompt::Provenance;
use serde::{Deserialize, Serialize};

/// Policy knobs driving the retrieval escalator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalPolicy {
    /// Nearest neighbours fetched per corpus query
    pub top_k: usize,

    /// Minimum cosine similarity for a corpus match to count. 0.6 trusts
    /// only strong matches; lowering it (e.g. 0.3) trades precision for
    /// recall.
    pub similarity_threshold: f32,

    /// Trusted institutional domain for the scoped-web tier
    pub scope_domain: String,

    /// Cap on general-web context, in characters
    pub max_web_context_chars: usize,

    /// Chunk size for web-content ingestion
    pub chunk_size: usize,

    /// Chunk overlap for web-content ingestion
    pub chunk_overlap: usize,
}

impl RetrievalPolicy {
    /// Build a policy from the application configuration sections.
    pub fn from_settings(retrieval: &RetrievalSettings, search: &SearchSettings) -> Self {
        Self {
            top_k: retrieval.top_k,
            similarity_threshold: retrieval.similarity_threshold,
            scope_domain: search.scope_domain.clone(),
            max_web_context_chars: retrieval.max_web_context_chars,
            chunk_size: retrieval.chunk_size,
            chunk_overlap: retrieval.chunk_overlap,
        }
    }
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.6,
            scope_domain: "christuniversity.in".to_string(),
            max_web_context_chars: 4000,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Outcome of the escalation ladder for one query: the context of the first
/// tier that produced usable content, or none at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalatedContext {
    /// Retrieved context, absent at the general-knowledge tier
    pub context: Option<String>,

    /// The tier that supplied the context
    pub provenance: Provenance,
}

/// A finished answer with its provenance tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    /// Final answer text, provenance note included
    pub text: String,

    /// The tier that supplied the context behind the answer
    pub provenance: Provenance,
}
