//! Combination of chunk outcomes and final synthesis.
//!
//! The aggregator renders every outcome — successes and failures alike — as a
//! labeled section in chunk-index order, then asks the backend for one final
//! structured technical document. Total failure short-circuits to a fixed
//! sentinel without touching the backend; an exhausted synthesis budget
//! yields a distinct sentinel. Either way the caller always receives text,
//! never a raised fault.

use crate::client::InferenceClient;
use crate::retry::{RetryPolicy, with_retry};

use super::dispatch::ChunkOutcome;

/// Returned when every chunk failed and there is nothing to synthesize.
pub const NO_SUMMARY_SENTINEL: &str =
    "No meaningful summary could be generated. All chunks failed processing.";

/// Returned when the final synthesis call exhausted its retry budget.
pub const SYNTHESIS_FAILED_SENTINEL: &str =
    "Failed to generate final summary after multiple attempts.";

/// System prompt for the final synthesis call.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You are a technical documentation writer. \
     Focus ONLY on technical details, implementations, and results. \
     DO NOT mention papers, citations, or authors.";

/// Renders the ordered outcomes as one combined document.
///
/// Each outcome becomes a `"Section N:"` block in chunk-index order; failures
/// are rendered as inline error markers rather than omitted, so section
/// numbering always matches chunk positions.
pub fn combine(outcomes: &[ChunkOutcome]) -> String {
    outcomes
        .iter()
        .map(|outcome| match outcome {
            ChunkOutcome::Success { index, text } => format!("Section {index}:\n{text}"),
            ChunkOutcome::Failure {
                index,
                reason,
                attempts,
            } => format!(
                "Section {index}:\nError processing chunk {index} after {attempts} attempts: {reason}"
            ),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn synthesis_user_prompt(combined: &str) -> String {
    format!(
        "Create a comprehensive technical document focusing ONLY on the implementation and results.\n\
         Structure the content into these sections:\n\n\
         1. System Architecture\n\
         2. Technical Implementation\n\
         3. Infrastructure & Setup\n\
         4. Performance Analysis\n\
         5. Optimization Techniques\n\n\
         CRITICAL INSTRUCTIONS:\n\
         - Focus ONLY on technical details and implementations\n\
         - Include specific numbers, metrics, and measurements\n\
         - Explain HOW things work\n\
         - DO NOT include any citations or references\n\
         - DO NOT mention other research or related work\n\
         - Some sections may contain error messages - please ignore these and work with available information\n\n\
         Content to organize:\n{combined}"
    )
}

/// Combines the outcomes and issues the retry-wrapped final synthesis call.
///
/// Always returns text: the synthesized document, or one of the two
/// sentinels.
pub async fn aggregate(
    client: &InferenceClient,
    policy: RetryPolicy,
    outcomes: &[ChunkOutcome],
) -> String {
    if !outcomes.iter().any(ChunkOutcome::is_success) {
        tracing::warn!(
            outcomes = outcomes.len(),
            "no successful chunk summaries, skipping final synthesis"
        );
        return NO_SUMMARY_SENTINEL.to_string();
    }

    let combined = combine(outcomes);
    tracing::info!(
        combined_chars = combined.len(),
        sections = outcomes.len(),
        "generating final summary"
    );

    let user_prompt = synthesis_user_prompt(&combined);
    match with_retry(policy, || {
        client.complete(SYNTHESIS_SYSTEM_PROMPT, &user_prompt)
    })
    .await
    {
        Ok(summary) => {
            tracing::info!(summary_chars = summary.len(), "final summary generated");
            summary
        }
        Err(exhausted) => {
            tracing::error!(
                attempts = exhausted.attempts,
                error = %exhausted.last_error,
                "final synthesis exhausted its retry budget"
            );
            SYNTHESIS_FAILED_SENTINEL.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn success(index: usize, text: &str) -> ChunkOutcome {
        ChunkOutcome::Success {
            index,
            text: text.to_string(),
        }
    }

    fn failure(index: usize) -> ChunkOutcome {
        ChunkOutcome::Failure {
            index,
            reason: "inference request timed out".to_string(),
            attempts: 3,
        }
    }

    #[test]
    fn combine_labels_sections_in_index_order() {
        let combined = combine(&[success(1, "alpha"), failure(2), success(3, "gamma")]);
        let sections: Vec<&str> = combined.split("\n\n").collect();
        assert_eq!(sections.len(), 3);
        assert!(sections[0].starts_with("Section 1:\nalpha"));
        assert!(sections[1].starts_with("Section 2:\nError processing chunk 2 after 3 attempts"));
        assert!(sections[2].starts_with("Section 3:\ngamma"));
    }

    #[test]
    fn combine_keeps_summaries_that_look_like_errors() {
        // A legitimate summary starting with "Error" is still a summary.
        let combined = combine(&[success(1, "Error handling is implemented with enums")]);
        assert!(combined.contains("Section 1:\nError handling is implemented with enums"));
    }

    #[tokio::test]
    async fn all_failures_short_circuit_without_backend_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(200)
                    .json_body(serde_json::json!({"message": {"content": "unused"}}));
            })
            .await;

        let config = PipelineConfig::default().with_endpoint(server.url("/api/chat"));
        let client = InferenceClient::new(&config).unwrap();
        let result = aggregate(
            &client,
            RetryPolicy::new(0, Duration::ZERO),
            &[failure(1), failure(2)],
        )
        .await;

        assert_eq!(result, NO_SUMMARY_SENTINEL);
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn one_success_triggers_exactly_one_synthesis_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/chat")
                    .body_contains("Section 1:")
                    .body_contains("Section 2:");
                then.status(200)
                    .json_body(serde_json::json!({"message": {"content": "the document"}}));
            })
            .await;

        let config = PipelineConfig::default().with_endpoint(server.url("/api/chat"));
        let client = InferenceClient::new(&config).unwrap();
        let result = aggregate(
            &client,
            RetryPolicy::new(0, Duration::ZERO),
            &[success(1, "alpha"), failure(2)],
        )
        .await;

        assert_eq!(result, "the document");
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn exhausted_synthesis_returns_failure_sentinel() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(500);
            })
            .await;

        let config = PipelineConfig::default().with_endpoint(server.url("/api/chat"));
        let client = InferenceClient::new(&config).unwrap();
        let result = aggregate(
            &client,
            RetryPolicy::new(1, Duration::ZERO),
            &[success(1, "alpha")],
        )
        .await;

        assert_eq!(result, SYNTHESIS_FAILED_SENTINEL);
        assert_eq!(mock.hits_async().await, 2);
    }
}
