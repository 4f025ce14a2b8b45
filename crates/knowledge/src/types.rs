//! Knowledge system type definitions.

use handbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an index entry, tagged with its origin namespace.
///
/// Handbook ids render as bare integers (`"42"`); web-ingested ids carry the
/// `web-` prefix (`"web-42"`). The two namespaces are disjoint by
/// construction, so corpus seeding and concurrent web ingestion can never
/// collide on a key. String round-tripping is lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkId {
    /// Entry created at corpus load time
    Handbook(u64),

    /// Entry created by web-content ingestion
    Web(u64),
}

impl ChunkId {
    /// Whether this id belongs to the web-ingestion namespace.
    pub fn is_web(&self) -> bool {
        matches!(self, Self::Web(_))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handbook(n) => write!(f, "{}", n),
            Self::Web(n) => write!(f, "web-{}", n),
        }
    }
}

impl FromStr for ChunkId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        if let Some(rest) = s.strip_prefix("web-") {
            let n = rest
                .parse::<u64>()
                .map_err(|_| AppError::Index(format!("Invalid web chunk id: {}", s)))?;
            Ok(Self::Web(n))
        } else {
            let n = s
                .parse::<u64>()
                .map_err(|_| AppError::Index(format!("Invalid chunk id: {}", s)))?;
            Ok(Self::Handbook(n))
        }
    }
}

impl Serialize for ChunkId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChunkId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One entry in the vector index: `id -> (vector, text)`.
///
/// Entries are immutable once written; re-upserting an id overwrites the
/// whole entry, and nothing ever deletes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Globally unique identifier
    pub id: ChunkId,

    /// Embedding vector (document mode)
    pub vector: Vec<f32>,

    /// Chunk text payload
    pub text: String,
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// Entry identifier
    pub id: ChunkId,

    /// Chunk text
    pub text: String,

    /// Cosine similarity against the query vector, in [-1, 1]
    pub score: f32,
}

/// Result of a nearest-neighbour query: matches in descending score order,
/// ties broken by insertion order. Ephemeral — produced per query and
/// consumed immediately by the escalator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub matches: Vec<ScoredChunk>,
}

impl RetrievalResult {
    /// Drop matches at or below the similarity threshold.
    pub fn above_threshold(self, threshold: f32) -> Self {
        Self {
            matches: self
                .matches
                .into_iter()
                .filter(|m| m.score > threshold)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
