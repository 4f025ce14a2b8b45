//! Groq LLM provider implementation.
//!
//! Groq serves an OpenAI-compatible chat completions API. Streaming uses
//! server-sent events: `data: {json}` lines terminated by `data: [DONE]`.

use crate::client::{
    LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage, Role,
};
use futures::StreamExt;
use handbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL.
const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Wire format for a chat message.
#[derive(Debug, Serialize)]
struct GroqMessage {
    role: &'static str,
    content: String,
}

/// Groq API request format.
#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Groq API non-streaming response format.
#[derive(Debug, Deserialize)]
struct GroqResponse {
    model: String,
    choices: Vec<GroqChoice>,
    #[serde(default)]
    usage: Option<GroqUsage>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct GroqChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct GroqUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// One SSE event payload in a streaming response.
#[derive(Debug, Deserialize)]
struct GroqStreamEvent {
    choices: Vec<GroqStreamChoice>,
    #[serde(default)]
    x_groq: Option<GroqStreamMeta>,
}

#[derive(Debug, Deserialize)]
struct GroqStreamChoice {
    delta: GroqDelta,
}

#[derive(Debug, Deserialize)]
struct GroqDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqStreamMeta {
    #[serde(default)]
    usage: Option<GroqUsage>,
}

/// Groq chat completions client.
pub struct GroqClient {
    /// Base URL for the API
    base_url: String,

    /// Bearer credential
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a new Groq client with the default endpoint.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_base_url(api_key, DEFAULT_GROQ_URL)
    }

    /// Create a new Groq client with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Generation(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert LlmRequest to the Groq wire format.
    fn to_groq_request(&self, request: &LlmRequest) -> GroqRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref system) = request.system {
            messages.push(GroqMessage {
                role: "system",
                content: system.clone(),
            });
        }

        for message in &request.messages {
            messages.push(GroqMessage {
                role: match message.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: message.content.clone(),
            });
        }

        GroqRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: request.stream,
        }
    }

    async fn send(&self, body: &GroqRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to send request to Groq: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "Groq API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    /// Parse one `data:` SSE line into a stream chunk. Returns `None` for
    /// lines that carry no content (keep-alives, empty deltas).
    fn parse_sse_line(line: &str) -> Option<AppResult<LlmStreamChunk>> {
        let payload = line.strip_prefix("data:")?.trim();

        if payload.is_empty() {
            return None;
        }

        if payload == "[DONE]" {
            return Some(Ok(LlmStreamChunk {
                content: String::new(),
                done: true,
                usage: None,
            }));
        }

        match serde_json::from_str::<GroqStreamEvent>(payload) {
            Ok(event) => {
                let content = event
                    .choices
                    .first()
                    .and_then(|c| c.delta.content.clone())
                    .unwrap_or_default();
                let usage = event
                    .x_groq
                    .and_then(|m| m.usage)
                    .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens));

                if content.is_empty() && usage.is_none() {
                    return None;
                }

                Some(Ok(LlmStreamChunk {
                    content,
                    done: false,
                    usage,
                }))
            }
            Err(e) => Some(Err(AppError::Generation(format!(
                "Failed to parse stream event: {}",
                e
            )))),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Groq");
        tracing::debug!("Model: {}, {} messages", request.model, request.messages.len());

        let mut groq_request = self.to_groq_request(request);
        groq_request.stream = false;

        let response = self.send(&groq_request).await?;

        let groq_response: GroqResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse Groq response: {}", e)))?;

        let content = groq_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Generation("Groq returned no choices".to_string()))?;

        let usage = groq_response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        tracing::info!("Received completion from Groq");

        Ok(LlmResponse {
            content,
            model: groq_response.model,
            usage,
            done: true,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!("Starting streaming request to Groq");

        let mut groq_request = self.to_groq_request(request);
        groq_request.stream = true;

        let response = self.send(&groq_request).await?;

        // SSE events can be split across network reads, so carry an
        // incomplete trailing line between chunks in the scan state.
        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(|e| AppError::Generation(format!("Stream error: {}", e))))
            .scan(String::new(), |buffer, result| {
                let chunks: Vec<AppResult<LlmStreamChunk>> = match result {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));

                        let mut out = Vec::new();
                        while let Some(newline) = buffer.find('\n') {
                            let line: String = buffer.drain(..=newline).collect();
                            if let Some(chunk) = Self::parse_sse_line(line.trim_end()) {
                                out.push(chunk);
                            }
                        }
                        out
                    }
                    Err(e) => vec![Err(e)],
                };
                futures::future::ready(Some(chunks))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;

    #[test]
    fn test_groq_client_creation() {
        let client = GroqClient::new("test-key").unwrap();
        assert_eq!(client.provider_name(), "groq");
        assert_eq!(client.base_url, DEFAULT_GROQ_URL);
    }

    #[test]
    fn test_groq_request_conversion() {
        let client = GroqClient::new("test-key").unwrap();
        let request = LlmRequest::new(
            vec![
                ChatMessage::user("What are the library hours?"),
                ChatMessage::assistant("9am to 9pm."),
                ChatMessage::user("And on weekends?"),
            ],
            "llama3-8b-8192",
        )
        .with_system("Answer from the handbook.")
        .with_temperature(0.2);

        let groq_req = client.to_groq_request(&request);
        assert_eq!(groq_req.model, "llama3-8b-8192");
        assert_eq!(groq_req.messages.len(), 4);
        assert_eq!(groq_req.messages[0].role, "system");
        assert_eq!(groq_req.messages[1].role, "user");
        assert_eq!(groq_req.messages[2].role, "assistant");
        assert_eq!(groq_req.temperature, Some(0.2));
    }

    #[test]
    fn test_parse_sse_content_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        let chunk = GroqClient::parse_sse_line(line).unwrap().unwrap();
        assert_eq!(chunk.content, "Hello");
        assert!(!chunk.done);
    }

    #[test]
    fn test_parse_sse_done_sentinel() {
        let chunk = GroqClient::parse_sse_line("data: [DONE]").unwrap().unwrap();
        assert!(chunk.done);
        assert!(chunk.content.is_empty());
    }

    #[test]
    fn test_parse_sse_empty_delta_skipped() {
        let line = r#"data: {"choices":[{"delta":{}}]}"#;
        assert!(GroqClient::parse_sse_line(line).is_none());
    }

    #[test]
    fn test_parse_sse_non_data_line_skipped() {
        assert!(GroqClient::parse_sse_line("").is_none());
        assert!(GroqClient::parse_sse_line(": keep-alive").is_none());
    }
}
