//! LLM integration crate for the handbook agent.
//!
//! This crate provides a provider-agnostic abstraction for chat completion
//! backends with both single-shot and streaming generation behind one
//! trait-based interface.
//!
//! # Providers
//! - **Groq**: OpenAI-compatible chat completions API (default)
//!
//! # Example
//! ```no_run
//! use handbook_llm::{LlmClient, LlmRequest, providers::GroqClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GroqClient::new("api-key")?;
//! let request = LlmRequest::from_user("Hello!", "llama3-8b-8192");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage, Role,
};
pub use factory::create_client;
pub use providers::GroqClient;
