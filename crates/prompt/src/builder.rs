//! Prompt builder: renders a provenance-keyed template into the final user
//! message for the generation client.

use crate::provenance::Provenance;
use crate::templates::{template_for, ResponseStyle};
use handbook_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build the user prompt for one answer.
///
/// Selects the template for `provenance`, injects the context (ignored by
/// the general-knowledge template), the question, and the style
/// instruction, and renders it with Handlebars.
///
/// # Example
/// ```
/// use handbook_prompt::{build_prompt, Provenance, ResponseStyle};
///
/// let prompt = build_prompt(
///     Provenance::Corpus,
///     Some("Late fees are 5 rupees per day."),
///     "What is the library late-fee policy?",
///     ResponseStyle::Detailed,
/// ).unwrap();
/// assert!(prompt.contains("Late fees"));
/// ```
pub fn build_prompt(
    provenance: Provenance,
    context: Option<&str>,
    question: &str,
    style: ResponseStyle,
) -> AppResult<String> {
    tracing::debug!(
        "Building prompt for tier '{}' ({} bytes of context)",
        provenance,
        context.map(str::len).unwrap_or(0)
    );

    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.unwrap_or("").to_string());
    variables.insert("question".to_string(), question.to_string());
    variables.insert("style".to_string(), style.instruction().to_string());

    render_template(template_for(provenance), &variables)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Serialization(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Serialization(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_corpus_prompt() {
        let prompt = build_prompt(
            Provenance::Corpus,
            Some("Hostel curfew is 10pm."),
            "When is curfew?",
            ResponseStyle::Detailed,
        )
        .unwrap();

        assert!(prompt.contains("Hostel curfew is 10pm."));
        assert!(prompt.contains("When is curfew?"));
        assert!(prompt.contains("handbook knowledge base"));
    }

    #[test]
    fn test_build_concise_prompt() {
        let prompt = build_prompt(
            Provenance::Corpus,
            Some("ctx"),
            "q",
            ResponseStyle::Concise,
        )
        .unwrap();

        assert!(prompt.contains("single, concise sentence"));
    }

    #[test]
    fn test_general_knowledge_prompt_omits_context() {
        let prompt = build_prompt(
            Provenance::GeneralKnowledge,
            None,
            "Who wrote Hamlet?",
            ResponseStyle::Detailed,
        )
        .unwrap();

        assert!(prompt.contains("Who wrote Hamlet?"));
        assert!(prompt.contains("general knowledge"));
    }

    #[test]
    fn test_no_html_escaping() {
        let prompt = build_prompt(
            Provenance::Corpus,
            Some("Fees & fines are <b>waived</b>."),
            "q",
            ResponseStyle::Detailed,
        )
        .unwrap();

        assert!(prompt.contains("Fees & fines are <b>waived</b>."));
    }
}
