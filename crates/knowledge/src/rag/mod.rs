//! Retrieval-augmented answering.
//!
//! Ties the escalator and the composer together behind a [`Pipeline`] that
//! owns the collaborators (embedding client, vector index, search provider,
//! generation client) and the retrieval policy. One call per user turn;
//! the conversation history is read, never stored.

pub mod compose;
pub mod escalate;
pub mod types;

pub use compose::{compose, compose_stream};
pub use escalate::escalate;
pub use types::{AnswerEnvelope, EscalatedContext, RetrievalPolicy};

use crate::embeddings::EmbeddingClient;
use crate::index::VectorIndex;
use handbook_core::{AppError, AppResult};
use handbook_llm::{ChatMessage, LlmClient, LlmStream, Role};
use handbook_prompt::{Provenance, ResponseStyle};
use handbook_websearch::SearchProvider;
use std::sync::Arc;

/// The latest user turn in a conversation — the active query.
pub fn latest_user_query(history: &[ChatMessage]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

/// Split the history into (prior turns, active query).
fn split_history(history: &[ChatMessage]) -> AppResult<(&[ChatMessage], &str)> {
    let position = history
        .iter()
        .rposition(|m| m.role == Role::User)
        .ok_or_else(|| AppError::Config("Conversation has no user turn".to_string()))?;

    Ok((&history[..position], history[position].content.as_str()))
}

/// The full question-answering pipeline.
pub struct Pipeline {
    embedder: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LlmClient>,
    policy: RetrievalPolicy,
    model: String,
}

impl Pipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        search: Arc<dyn SearchProvider>,
        llm: Arc<dyn LlmClient>,
        policy: RetrievalPolicy,
        model: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            index,
            search,
            llm,
            policy,
            model: model.into(),
        }
    }

    /// The vector index behind this pipeline.
    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// The embedding client behind this pipeline.
    pub fn embedder(&self) -> &dyn EmbeddingClient {
        self.embedder.as_ref()
    }

    /// Run escalation only, without generation.
    pub async fn retrieve(&self, query: &str) -> AppResult<EscalatedContext> {
        escalate(
            query,
            self.embedder.as_ref(),
            self.index.as_ref(),
            self.search.as_ref(),
            &self.policy,
        )
        .await
    }

    /// Answer the latest user turn in `history`, single-shot.
    pub async fn answer(
        &self,
        history: &[ChatMessage],
        style: ResponseStyle,
    ) -> AppResult<AnswerEnvelope> {
        let (prior, question) = split_history(history)?;
        let outcome = self.retrieve(question).await?;

        Ok(compose(
            prior,
            question,
            &outcome,
            self.llm.as_ref(),
            &self.model,
            style,
        )
        .await)
    }

    /// Answer the latest user turn in `history`, streaming.
    ///
    /// Returns the provenance up front (escalation has already finished by
    /// the time generation starts) together with the fragment stream.
    pub async fn answer_stream(
        &self,
        history: &[ChatMessage],
        style: ResponseStyle,
    ) -> AppResult<(Provenance, LlmStream)> {
        let (prior, question) = split_history(history)?;
        let outcome = self.retrieve(question).await?;
        let provenance = outcome.provenance;

        let stream = compose_stream(
            prior,
            question,
            &outcome,
            self.llm.as_ref(),
            &self.model,
            style,
        )
        .await;

        Ok((provenance, stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_user_query() {
        let history = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("answer"),
            ChatMessage::user("second"),
        ];
        assert_eq!(latest_user_query(&history), Some("second"));
        assert_eq!(latest_user_query(&[]), None);
    }

    #[test]
    fn test_split_history() {
        let history = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("answer"),
            ChatMessage::user("second"),
        ];
        let (prior, question) = split_history(&history).unwrap();
        assert_eq!(prior.len(), 2);
        assert_eq!(question, "second");
    }

    #[test]
    fn test_split_history_requires_user_turn() {
        let history = vec![ChatMessage::assistant("hello")];
        assert!(split_history(&history).is_err());
    }
}
