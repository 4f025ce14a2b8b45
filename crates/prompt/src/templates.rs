//! Prompt templates keyed by provenance tier.
//!
//! One template per tier. Tiers with retrieved context instruct the model to
//! answer strictly from that context; the general-knowledge tier instructs
//! it to answer from its own knowledge and to acknowledge that the handbook
//! did not cover the question.

use crate::provenance::Provenance;
use serde::{Deserialize, Serialize};

/// Requested answer length/register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    /// Full answer with supporting detail
    #[default]
    Detailed,

    /// A single concise sentence
    Concise,
}

impl ResponseStyle {
    /// The instruction fragment injected into templates as `{{style}}`.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Detailed => "Give a complete answer with the relevant details.",
            Self::Concise => "Answer in a single, concise sentence.",
        }
    }
}

const CORPUS_TEMPLATE: &str = "\
You are an assistant answering questions about the student handbook.
Answer the user's question using only the context below, which comes from
the handbook knowledge base. If the context does not contain the answer,
say so plainly instead of guessing. {{style}}

CONTEXT FROM HANDBOOK:
{{context}}

QUESTION:
{{question}}

ANSWER:";

const SCOPED_WEB_TEMPLATE: &str = "\
You are an assistant answering questions about the student handbook.
The handbook itself did not cover this question, so the context below was
retrieved from the official university website. Answer using only that
context. If it does not contain the answer, say so plainly. {{style}}

CONTEXT FROM THE UNIVERSITY WEBSITE:
{{context}}

QUESTION:
{{question}}

ANSWER:";

const GENERAL_WEB_TEMPLATE: &str = "\
You are an assistant answering questions about the student handbook.
Neither the handbook nor the university website covered this question, so
the context below comes from a general web search and may be less
authoritative. Answer from that context, and be clear about anything it
leaves uncertain. {{style}}

CONTEXT FROM WEB SEARCH:
{{context}}

QUESTION:
{{question}}

ANSWER:";

const GENERAL_KNOWLEDGE_TEMPLATE: &str = "\
You are an assistant answering questions about the student handbook.
No information about this question was found in the handbook, on the
university website, or in a web search. Answer the question from your
general knowledge, and state clearly that the answer does not come from
the handbook. {{style}}

QUESTION:
{{question}}

ANSWER:";

/// Get the template body for a provenance tier.
pub fn template_for(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::Corpus => CORPUS_TEMPLATE,
        Provenance::ScopedWeb => SCOPED_WEB_TEMPLATE,
        Provenance::GeneralWeb => GENERAL_WEB_TEMPLATE,
        Provenance::GeneralKnowledge => GENERAL_KNOWLEDGE_TEMPLATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_tiers_reference_context() {
        for tier in [
            Provenance::Corpus,
            Provenance::ScopedWeb,
            Provenance::GeneralWeb,
        ] {
            assert!(template_for(tier).contains("{{context}}"), "{:?}", tier);
        }
    }

    #[test]
    fn test_general_knowledge_has_no_context_slot() {
        assert!(!template_for(Provenance::GeneralKnowledge).contains("{{context}}"));
    }

    #[test]
    fn test_all_templates_take_question_and_style() {
        for tier in [
            Provenance::Corpus,
            Provenance::ScopedWeb,
            Provenance::GeneralWeb,
            Provenance::GeneralKnowledge,
        ] {
            let template = template_for(tier);
            assert!(template.contains("{{question}}"));
            assert!(template.contains("{{style}}"));
        }
    }

    #[test]
    fn test_style_instructions_differ() {
        assert_ne!(
            ResponseStyle::Detailed.instruction(),
            ResponseStyle::Concise.instruction()
        );
    }
}
