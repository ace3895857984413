//! Per-chunk technical extraction.
//!
//! [`ChunkSummarize`] is the seam between the dispatcher and the inference
//! backend: the production implementation ([`ChunkSummarizer`]) wraps one
//! [`InferenceClient`] call with a fixed extraction prompt, and tests swap in
//! scripted implementations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{InferenceClient, InferenceError};
use crate::segmenter::Chunk;

/// System prompt for per-chunk extraction.
pub const CHUNK_SYSTEM_PROMPT: &str =
    "Extract only technical details. No citations or references.";

/// Summarizes a single chunk of document text.
///
/// Implementations must be side-effect-free beyond their backend call and
/// keep no state between chunks — the dispatcher may invoke them from many
/// tasks at once, and the retry controller may invoke them repeatedly for the
/// same chunk.
#[async_trait]
pub trait ChunkSummarize: Send + Sync {
    /// Produces a technical extraction of `chunk`, or a classified failure.
    async fn summarize(&self, chunk: &Chunk) -> Result<String, InferenceError>;
}

/// Production summarizer backed by the shared inference client.
#[derive(Clone, Debug)]
pub struct ChunkSummarizer {
    client: Arc<InferenceClient>,
}

impl ChunkSummarizer {
    /// Creates a summarizer over the shared client.
    #[must_use]
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChunkSummarize for ChunkSummarizer {
    async fn summarize(&self, chunk: &Chunk) -> Result<String, InferenceError> {
        tracing::info!(
            chunk = chunk.index,
            total = chunk.total,
            chars = chunk.char_len(),
            "summarizing chunk"
        );
        let user_prompt = format!("Extract technical content: {}", chunk.text);
        let summary = self
            .client
            .complete(CHUNK_SYSTEM_PROMPT, &user_prompt)
            .await?;
        tracing::info!(
            chunk = chunk.index,
            total = chunk.total,
            summary_chars = summary.len(),
            "chunk summarized"
        );
        Ok(summary)
    }
}
