//! Embedding provider implementations.

pub mod cohere;
pub mod trigram;

pub use cohere::CohereClient;
pub use trigram::TrigramClient;
