//! Answer composition.
//!
//! Turns an escalation outcome into the final answer: renders the
//! provenance-keyed prompt, hands it to the generation client together with
//! the prior conversation turns, and appends the human-readable source note.
//! Both a single-shot and a streaming path exist behind the same contract;
//! the caller decides which to use. Generation failures become inline error
//! text — a broken LLM backend must not crash the chat loop.

use crate::rag::types::{AnswerEnvelope, EscalatedContext};
use futures::StreamExt;
use handbook_llm::{ChatMessage, LlmClient, LlmRequest, LlmStream, LlmStreamChunk};
use handbook_prompt::{build_prompt, ResponseStyle};

/// Sampling temperature when answering from retrieved context.
const TEMPERATURE_WITH_CONTEXT: f32 = 0.2;

/// Sampling temperature for general-knowledge answers.
const TEMPERATURE_WITHOUT_CONTEXT: f32 = 0.8;

/// Build the generation request for one answer.
///
/// `history` holds the prior conversation turns only — the active question
/// arrives separately and is replaced by the rendered prompt as the final
/// user message.
fn build_request(
    history: &[ChatMessage],
    question: &str,
    outcome: &EscalatedContext,
    model: &str,
    style: ResponseStyle,
) -> handbook_core::AppResult<LlmRequest> {
    let prompt = build_prompt(
        outcome.provenance,
        outcome.context.as_deref(),
        question,
        style,
    )?;

    let mut messages: Vec<ChatMessage> = history.to_vec();
    messages.push(ChatMessage::user(prompt));

    let temperature = if outcome.context.is_some() {
        TEMPERATURE_WITH_CONTEXT
    } else {
        TEMPERATURE_WITHOUT_CONTEXT
    };

    Ok(LlmRequest::new(messages, model).with_temperature(temperature))
}

/// Compose a single-shot answer.
pub async fn compose(
    history: &[ChatMessage],
    question: &str,
    outcome: &EscalatedContext,
    llm: &dyn LlmClient,
    model: &str,
    style: ResponseStyle,
) -> AnswerEnvelope {
    let provenance = outcome.provenance;

    let request = match build_request(history, question, outcome, model, style) {
        Ok(request) => request,
        Err(e) => {
            return AnswerEnvelope {
                text: format!("Error generating response: {}", e),
                provenance,
            }
        }
    };

    match llm.complete(&request).await {
        Ok(response) => AnswerEnvelope {
            text: format!("{}\n\n{}", response.content.trim_end(), provenance.note()),
            provenance,
        },
        Err(e) => {
            tracing::error!("Generation failed: {}", e);
            AnswerEnvelope {
                text: format!("Error generating response: {}", e),
                provenance,
            }
        }
    }
}

/// Compose a streaming answer.
///
/// Fragments are delivered in generation order; the provenance note arrives
/// as the final fragment, marked `done`. Errors — at stream creation or
/// mid-stream — are folded into the stream as inline error text, so the
/// returned stream itself never fails.
pub async fn compose_stream(
    history: &[ChatMessage],
    question: &str,
    outcome: &EscalatedContext,
    llm: &dyn LlmClient,
    model: &str,
    style: ResponseStyle,
) -> LlmStream {
    let provenance = outcome.provenance;

    let request = match build_request(history, question, outcome, model, style) {
        Ok(request) => request.with_streaming(),
        Err(e) => return error_stream(format!("Error generating response: {}", e)),
    };

    let body = match llm.stream(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("Generation failed: {}", e);
            return error_stream(format!("Error generating response: {}", e));
        }
    };

    let note = LlmStreamChunk {
        content: format!("\n\n{}", provenance.note()),
        done: true,
        usage: None,
    };

    let stream = body
        // Drop the provider's terminator; the note fragment closes the
        // stream instead.
        .take_while(|item| {
            futures::future::ready(!matches!(item, Ok(chunk) if chunk.done))
        })
        .map(|item| match item {
            Ok(chunk) => Ok(chunk),
            Err(e) => {
                tracing::error!("Stream error mid-answer: {}", e);
                Ok(LlmStreamChunk {
                    content: format!("\n[Error generating response: {}]", e),
                    done: false,
                    usage: None,
                })
            }
        })
        .chain(futures::stream::iter(vec![Ok(note)]));

    Box::pin(stream)
}

/// A one-fragment stream carrying error text.
fn error_stream(text: String) -> LlmStream {
    Box::pin(futures::stream::iter(vec![Ok(LlmStreamChunk {
        content: text,
        done: true,
        usage: None,
    })]))
}
