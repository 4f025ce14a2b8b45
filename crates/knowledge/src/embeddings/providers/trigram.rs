//! Trigram embedding provider using character trigram-based content-aware
//! embeddings.
//!
//! Runs fully offline. Not semantically accurate like a neural model, but
//! deterministic and content-dependent, which makes it useful for keyless
//! operation and for tests. Every call is recorded with its input mode so
//! tests can assert that document and query embeddings travel through
//! distinct modes.

use crate::embeddings::{EmbeddingClient, InputType};
use handbook_core::AppResult;
use std::sync::Mutex;

/// Trigram-based embedding provider for local, offline operation.
#[derive(Debug)]
pub struct TrigramClient {
    dimensions: usize,
    calls: Mutex<Vec<(InputType, usize)>>,
}

impl TrigramClient {
    /// Create a new trigram client with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The `(input_type, batch_size)` of every embed call so far, in order.
    pub fn recorded_calls(&self) -> Vec<(InputType, usize)> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Generate a trigram-based embedding for text.
    fn generate_trigram_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();

        // Filter stop words for better discrimination
        let stop_words: std::collections::HashSet<&str> = [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to",
            "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have",
            "has", "had", "it", "its", "their", "they", "them",
        ]
        .iter()
        .copied()
        .collect();

        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .collect();

        // Build word frequency map
        let mut word_freq = std::collections::HashMap::new();
        for word in &words {
            *word_freq.entry(*word).or_insert(0) += 1;
        }

        // Map each unique word to multiple dimensions based on character
        // trigrams, which yields more specific vectors than whole-word
        // hashing alone
        for (word, freq) in word_freq.iter() {
            let chars: Vec<char> = word.chars().collect();
            for i in 0..chars.len().saturating_sub(2) {
                let trigram = format!(
                    "{}{}{}",
                    chars[i],
                    chars[i + 1],
                    chars.get(i + 2).unwrap_or(&' ')
                );
                let trigram_hash = trigram
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));

                let dim_idx = (trigram_hash as usize) % self.dimensions;
                embedding[dim_idx] += (*freq as f32).sqrt(); // sqrt scale for better distribution
            }

            // Also encode whole word
            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            let base_dim = (word_hash as usize) % self.dimensions;
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for TrigramClient {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[String], input_type: InputType) -> AppResult<Vec<Vec<f32>>> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push((input_type, texts.len()));

        Ok(texts
            .iter()
            .map(|text| self.generate_trigram_embedding(text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigram_client_dimensions() {
        let client = TrigramClient::new(384);
        assert_eq!(client.dimensions(), 384);
        assert_eq!(client.provider_name(), "trigram");
        assert_eq!(client.model_name(), "trigram-v1");
    }

    #[tokio::test]
    async fn test_embed_query_single() {
        let client = TrigramClient::new(384);
        let embedding = client.embed_query("hello world").await.unwrap();

        assert_eq!(embedding.len(), 384);

        // Verify normalization (unit vector)
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_embed_documents_batch() {
        let client = TrigramClient::new(384);
        let texts = vec![
            "hello world".to_string(),
            "test embedding".to_string(),
            "rust programming".to_string(),
        ];

        let embeddings = client.embed_documents(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for embedding in &embeddings {
            assert_eq!(embedding.len(), 384);

            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 0.001);
        }
    }

    #[tokio::test]
    async fn test_deterministic() {
        let client = TrigramClient::new(384);
        let text = "deterministic test";

        let embedding1 = client.embed_query(text).await.unwrap();
        let embedding2 = client.embed_query(text).await.unwrap();

        assert_eq!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let client = TrigramClient::new(384);

        let embedding1 = client.embed_query("hello world").await.unwrap();
        let embedding2 = client.embed_query("goodbye world").await.unwrap();

        assert_ne!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_identical_text_similar_across_modes() {
        // The trigram model is symmetric, but the calls themselves must
        // still travel through distinct modes.
        let client = TrigramClient::new(384);
        let doc = client
            .embed_documents(&["late fee policy".to_string()])
            .await
            .unwrap();
        let query = client.embed_query("late fee policy").await.unwrap();
        assert_eq!(doc[0], query);
    }

    #[tokio::test]
    async fn test_call_log_records_modes() {
        let client = TrigramClient::new(64);

        client
            .embed_documents(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        client.embed_query("c").await.unwrap();

        let calls = client.recorded_calls();
        assert_eq!(calls, vec![(InputType::Document, 2), (InputType::Query, 1)]);
    }

    #[tokio::test]
    async fn test_empty_text_zero_vector() {
        let client = TrigramClient::new(384);
        let embedding = client.embed_query("").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
