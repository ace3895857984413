//! # Papergist: chunked parallel document summarization
//!
//! Papergist turns a long extracted document into one coherent technical
//! summary by splitting it into overlapping character-budgeted chunks,
//! summarizing every chunk concurrently against an Ollama-style chat
//! backend with bounded retry and exponential backoff, and synthesizing the
//! per-chunk extractions into a final structured document.
//!
//! ## Pipeline stages
//!
//! - [`segmenter`]: deterministic splitting at semantic boundaries
//!   (paragraph → line → sentence → word → hard split) under a character
//!   budget, with trailing overlap across chunk boundaries.
//! - [`client`]: one shared HTTP client for non-streaming chat completions,
//!   with a closed error taxonomy ([`client::InferenceError`]).
//! - [`summarizer`]: the per-chunk extraction seam ([`summarizer::ChunkSummarize`]).
//! - [`retry`]: a generic bounded-retry combinator used for both chunk
//!   summarization and final synthesis.
//! - [`pipeline`]: concurrent fan-out, index-aligned outcome collection, and
//!   final aggregation behind [`pipeline::SummaryPipeline`].
//!
//! Partial failures are absorbed: a chunk that exhausts its retries becomes a
//! labeled error section in the combined document, and only total failure
//! surfaces — as a fixed sentinel string, never a raised fault.
//!
//! ## Quick start
//!
//! ```no_run
//! use papergist::config::PipelineConfig;
//! use papergist::pipeline::SummaryPipeline;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_env()?.with_max_concurrency(4);
//! let pipeline = SummaryPipeline::new(config)?;
//! let summary = pipeline.summarize("...extracted document text...").await;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod fetch;
pub mod message;
pub mod pipeline;
pub mod retry;
pub mod segmenter;
pub mod summarizer;

pub use client::{InferenceClient, InferenceError};
pub use config::PipelineConfig;
pub use pipeline::{ChunkOutcome, SummaryPipeline};
pub use retry::{RetryPolicy, with_retry};
pub use segmenter::{Chunk, Segmenter};
