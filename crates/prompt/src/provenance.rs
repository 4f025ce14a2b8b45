//! Provenance tags for answers.
//!
//! Every answer carries exactly one provenance tag identifying which
//! retrieval tier supplied its context. The tag selects the prompt template
//! and the human-readable source note appended to the answer.

use serde::{Deserialize, Serialize};

/// The retrieval tier that supplied the context behind an answer.
///
/// Tiers are strictly ordered; the escalator reports the first tier that
/// produced usable content and never overrides it with a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Answered from the pre-indexed handbook corpus
    Corpus,

    /// Answered from a search scoped to the trusted institutional domain
    ScopedWeb,

    /// Answered from an unrestricted web search
    GeneralWeb,

    /// No usable context found; answered from model knowledge
    GeneralKnowledge,
}

impl Provenance {
    /// Short label for logging and JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Corpus => "corpus",
            Self::ScopedWeb => "scoped-web",
            Self::GeneralWeb => "general-web",
            Self::GeneralKnowledge => "general-knowledge",
        }
    }

    /// Human-readable source note appended to every answer.
    pub fn note(&self) -> &'static str {
        match self {
            Self::Corpus => "Source: student handbook knowledge base.",
            Self::ScopedWeb => {
                "Source: official university website (added to the knowledge base for future questions)."
            }
            Self::GeneralWeb => "Source: general web search.",
            Self::GeneralKnowledge => {
                "Note: answered from general knowledge, not from the handbook knowledge base."
            }
        }
    }

    /// Whether answers at this tier are grounded in retrieved context.
    pub fn has_context(&self) -> bool {
        !matches!(self, Self::GeneralKnowledge)
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_distinct() {
        let tiers = [
            Provenance::Corpus,
            Provenance::ScopedWeb,
            Provenance::GeneralWeb,
            Provenance::GeneralKnowledge,
        ];
        for (i, a) in tiers.iter().enumerate() {
            for b in &tiers[i + 1..] {
                assert_ne!(a.label(), b.label());
                assert_ne!(a.note(), b.note());
            }
        }
    }

    #[test]
    fn test_general_knowledge_has_disclaimer() {
        let note = Provenance::GeneralKnowledge.note();
        assert!(note.contains("not from the handbook knowledge base"));
        assert!(!Provenance::GeneralKnowledge.has_context());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Provenance::ScopedWeb).unwrap();
        assert_eq!(json, "\"scoped-web\"");
    }
}
