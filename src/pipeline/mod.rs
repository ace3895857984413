//! The chunked parallel summarization pipeline.
//!
//! [`SummaryPipeline`] wires the stages together: segmentation, concurrent
//! retry-wrapped chunk summarization, and final aggregation. Construct it
//! once from a [`PipelineConfig`] and call [`summarize`](SummaryPipeline::summarize)
//! per document; the pipeline keeps no state between invocations beyond the
//! shared HTTP connection pool.

pub mod aggregate;
pub mod dispatch;

use std::sync::Arc;

use crate::client::InferenceClient;
use crate::config::{ConfigError, PipelineConfig};
use crate::fetch::{DocumentSource, FetchError};
use crate::segmenter::Segmenter;
use crate::summarizer::{ChunkSummarize, ChunkSummarizer};

pub use aggregate::{NO_SUMMARY_SENTINEL, SYNTHESIS_FAILED_SENTINEL, combine};
pub use dispatch::{ChunkOutcome, dispatch};

/// End-to-end summarization pipeline.
///
/// # Examples
///
/// ```no_run
/// use papergist::config::PipelineConfig;
/// use papergist::pipeline::SummaryPipeline;
///
/// # async fn run() -> Result<(), papergist::config::ConfigError> {
/// let pipeline = SummaryPipeline::new(PipelineConfig::default())?;
/// let summary = pipeline.summarize("full extracted document text").await;
/// println!("{summary}");
/// # Ok(())
/// # }
/// ```
pub struct SummaryPipeline {
    config: PipelineConfig,
    segmenter: Segmenter,
    client: Arc<InferenceClient>,
    summarizer: Arc<dyn ChunkSummarize>,
}

impl SummaryPipeline {
    /// Builds a pipeline with the production chunk summarizer.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        let client = Arc::new(InferenceClient::new(&config)?);
        let summarizer = Arc::new(ChunkSummarizer::new(Arc::clone(&client)));
        Ok(Self::with_summarizer(config, client, summarizer))
    }

    /// Builds a pipeline with a custom chunk summarizer implementation.
    ///
    /// The seam exists for tests and for callers that wrap the production
    /// summarizer (caching, instrumentation).
    #[must_use]
    pub fn with_summarizer(
        config: PipelineConfig,
        client: Arc<InferenceClient>,
        summarizer: Arc<dyn ChunkSummarize>,
    ) -> Self {
        let segmenter = Segmenter::new(config.max_chunk_chars, config.overlap_chars);
        Self {
            config,
            segmenter,
            client,
            summarizer,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Summarizes already-extracted document text.
    ///
    /// Always returns text: the synthesized five-section technical document,
    /// or a sentinel when every chunk failed
    /// ([`NO_SUMMARY_SENTINEL`]) or the final synthesis exhausted its budget
    /// ([`SYNTHESIS_FAILED_SENTINEL`]). Business-logic failures never
    /// surface as errors from this method.
    pub async fn summarize(&self, text: &str) -> String {
        let chunks = self.segmenter.segment(text);
        tracing::info!(
            chars = text.chars().count(),
            token_estimate = text.len() / 4,
            chunks = chunks.len(),
            "segmented document"
        );
        for chunk in &chunks {
            tracing::debug!(
                chunk = chunk.index,
                total = chunk.total,
                chars = chunk.char_len(),
                "chunk sizes"
            );
        }

        let outcomes = dispatch(
            Arc::clone(&self.summarizer),
            self.config.chunk_retry,
            self.config.max_concurrency,
            chunks,
        )
        .await;

        aggregate::aggregate(&self.client, self.config.synthesis_retry, &outcomes).await
    }

    /// Fetches document text from `source` and summarizes it.
    ///
    /// Collaborator-level fetch failures are propagated to the caller; only
    /// summarization failures are absorbed into sentinels.
    pub async fn summarize_source(
        &self,
        source: &dyn DocumentSource,
        reference: &str,
    ) -> Result<String, FetchError> {
        let text = source.fetch(reference).await?;
        tracing::info!(
            reference,
            chars = text.chars().count(),
            "document fetched, starting summarization"
        );
        Ok(self.summarize(&text).await)
    }
}
