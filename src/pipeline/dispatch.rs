//! Concurrent fan-out of retry-wrapped chunk summarization.
//!
//! Every chunk is processed in its own task; the dispatcher waits for all of
//! them and returns exactly one [`ChunkOutcome`] per chunk, aligned with the
//! input order no matter when each task finishes. A chunk exhausting its
//! retry budget — or panicking outright — never disturbs its siblings.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;

use crate::retry::{RetryPolicy, with_retry};
use crate::segmenter::Chunk;
use crate::summarizer::ChunkSummarize;

/// Terminal result of processing one chunk.
///
/// Every chunk yields exactly one outcome; none is dropped silently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The chunk was summarized within its retry budget.
    Success {
        /// 1-based chunk position.
        index: usize,
        /// The generated extraction.
        text: String,
    },
    /// The chunk exhausted its retry budget or its task faulted.
    Failure {
        /// 1-based chunk position.
        index: usize,
        /// Description of the final error.
        reason: String,
        /// Invocations performed before giving up (0 for a task fault that
        /// never reported an attempt count).
        attempts: u32,
    },
}

impl ChunkOutcome {
    /// 1-based chunk position this outcome belongs to.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            ChunkOutcome::Success { index, .. } | ChunkOutcome::Failure { index, .. } => *index,
        }
    }

    /// True when the chunk produced a summary.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ChunkOutcome::Success { .. })
    }
}

/// Runs retry-wrapped summarization over all chunks concurrently.
///
/// Returns one outcome per chunk, index-aligned with `chunks`. When
/// `max_concurrency` is set, at most that many summarizations are in flight
/// at once; results are unaffected either way.
pub async fn dispatch(
    summarizer: Arc<dyn ChunkSummarize>,
    policy: RetryPolicy,
    max_concurrency: Option<usize>,
    chunks: Vec<Chunk>,
) -> Vec<ChunkOutcome> {
    if chunks.is_empty() {
        return Vec::new();
    }

    tracing::info!(
        chunks = chunks.len(),
        max_attempts = policy.max_attempts(),
        max_concurrency = ?max_concurrency,
        "dispatching chunk summarization"
    );

    let limiter = max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));
    let handles: Vec<_> = chunks
        .into_iter()
        .map(|chunk| {
            let summarizer = Arc::clone(&summarizer);
            let limiter = limiter.clone();
            tokio::spawn(async move {
                let _permit = match limiter {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                summarize_one(summarizer.as_ref(), policy, &chunk).await
            })
        })
        .collect();

    let joined = join_all(handles).await;
    let outcomes: Vec<ChunkOutcome> = joined
        .into_iter()
        .enumerate()
        .map(|(i, result)| match result {
            Ok(outcome) => outcome,
            // A panicked or cancelled task is converted into a labeled
            // failure; the dispatcher never propagates a fault.
            Err(join_err) => {
                tracing::error!(chunk = i + 1, error = %join_err, "chunk task faulted");
                ChunkOutcome::Failure {
                    index: i + 1,
                    reason: format!("task fault: {join_err}"),
                    attempts: 0,
                }
            }
        })
        .collect();

    let failures = outcomes.iter().filter(|o| !o.is_success()).count();
    tracing::info!(
        outcomes = outcomes.len(),
        failures,
        "all chunks reached a terminal state"
    );
    outcomes
}

async fn summarize_one(
    summarizer: &dyn ChunkSummarize,
    policy: RetryPolicy,
    chunk: &Chunk,
) -> ChunkOutcome {
    match with_retry(policy, || summarizer.summarize(chunk)).await {
        Ok(text) => ChunkOutcome::Success {
            index: chunk.index,
            text,
        },
        Err(exhausted) => {
            tracing::warn!(
                chunk = chunk.index,
                attempts = exhausted.attempts,
                error = %exhausted.last_error,
                "chunk failed after exhausting retries"
            );
            ChunkOutcome::Failure {
                index: chunk.index,
                reason: exhausted.last_error.to_string(),
                attempts: exhausted.attempts,
            }
        }
    }
}
