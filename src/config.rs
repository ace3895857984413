//! Pipeline configuration: the single source of truth for tunable parameters.
//!
//! Defaults match the reference deployment (local Ollama, 40k-character
//! chunks, two retries). Values can be overridden programmatically via the
//! `with_*` builders or from the environment via [`PipelineConfig::from_env`]
//! (`PAPERGIST_*` variables, `.env` files honored through `dotenvy`).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::RetryPolicy;

/// Default chat endpoint of a local Ollama instance.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/chat";
/// Default model name.
pub const DEFAULT_MODEL: &str = "gemma3:27b-16k";
/// Default chunk budget in characters (roughly 32k tokens).
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 40_000;
/// Default overlap carried across chunk boundaries, in characters.
pub const DEFAULT_OVERLAP_CHARS: usize = 100;
/// Default retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default backoff base for chunk summarization retries.
pub const DEFAULT_CHUNK_BACKOFF: Duration = Duration::from_secs(5);
/// Default backoff base for final synthesis retries.
pub const DEFAULT_SYNTHESIS_BACKOFF: Duration = Duration::from_secs(10);
/// Default connect timeout for backend requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
/// Default end-to-end timeout for one inference request. Long on purpose:
/// large-context inference is slow.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3600);

/// Errors raised while building or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backend endpoint is not a valid URL.
    #[error("invalid inference endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        /// The offending endpoint string.
        endpoint: String,
        /// Underlying parse error.
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    /// An environment variable override could not be parsed.
    #[error("failed to parse environment variable {key}: {message}")]
    EnvParse {
        /// Environment variable key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Process-wide tunables for the summarization pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Chat endpoint of the inference backend.
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Character budget per chunk.
    pub max_chunk_chars: usize,
    /// Overlap carried into the next chunk, in characters.
    pub overlap_chars: usize,
    /// Retry budget and backoff for per-chunk summarization.
    pub chunk_retry: RetryPolicy,
    /// Retry budget and backoff for the final synthesis call.
    pub synthesis_retry: RetryPolicy,
    /// Connect timeout for backend requests.
    pub connect_timeout: Duration,
    /// End-to-end timeout for one inference request.
    pub request_timeout: Duration,
    /// Cap on simultaneous in-flight chunk requests. `None` preserves the
    /// reference behavior of unbounded fan-out; setting it protects the
    /// backend without changing any result.
    pub max_concurrency: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            overlap_chars: DEFAULT_OVERLAP_CHARS,
            chunk_retry: RetryPolicy::new(DEFAULT_MAX_RETRIES, DEFAULT_CHUNK_BACKOFF),
            synthesis_retry: RetryPolicy::new(DEFAULT_MAX_RETRIES, DEFAULT_SYNTHESIS_BACKOFF),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrency: None,
        }
    }
}

impl PipelineConfig {
    /// Builds a configuration from defaults plus `PAPERGIST_*` environment
    /// overrides. `.env` files are honored.
    ///
    /// Recognized variables: `PAPERGIST_ENDPOINT`, `PAPERGIST_MODEL`,
    /// `PAPERGIST_MAX_CHUNK_CHARS`, `PAPERGIST_OVERLAP_CHARS`,
    /// `PAPERGIST_MAX_RETRIES`, `PAPERGIST_MAX_CONCURRENCY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("PAPERGIST_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("PAPERGIST_MODEL") {
            config.model = model;
        }
        if let Some(value) = parse_env::<usize>("PAPERGIST_MAX_CHUNK_CHARS")? {
            config.max_chunk_chars = value;
        }
        if let Some(value) = parse_env::<usize>("PAPERGIST_OVERLAP_CHARS")? {
            config.overlap_chars = value;
        }
        if let Some(value) = parse_env::<u32>("PAPERGIST_MAX_RETRIES")? {
            config.chunk_retry.max_retries = value;
            config.synthesis_retry.max_retries = value;
        }
        if let Some(value) = parse_env::<usize>("PAPERGIST_MAX_CONCURRENCY")? {
            config.max_concurrency = Some(value);
        }

        Ok(config)
    }

    /// Sets the backend endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the chunk budget and overlap.
    #[must_use]
    pub fn with_chunking(mut self, max_chunk_chars: usize, overlap_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars;
        self.overlap_chars = overlap_chars;
        self
    }

    /// Sets the per-chunk retry policy.
    #[must_use]
    pub fn with_chunk_retry(mut self, policy: RetryPolicy) -> Self {
        self.chunk_retry = policy;
        self
    }

    /// Sets the final synthesis retry policy.
    #[must_use]
    pub fn with_synthesis_retry(mut self, policy: RetryPolicy) -> Self {
        self.synthesis_retry = policy;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Caps simultaneous in-flight chunk requests.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| ConfigError::EnvParse {
                key: key.to_string(),
                message: err.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.endpoint, "http://localhost:11434/api/chat");
        assert_eq!(config.model, "gemma3:27b-16k");
        assert_eq!(config.max_chunk_chars, 40_000);
        assert_eq!(config.overlap_chars, 100);
        assert_eq!(config.chunk_retry.max_retries, 2);
        assert_eq!(config.chunk_retry.base_delay, Duration::from_secs(5));
        assert_eq!(config.synthesis_retry.base_delay, Duration::from_secs(10));
        assert_eq!(config.max_concurrency, None);
    }

    #[test]
    fn builders_override_defaults() {
        let config = PipelineConfig::default()
            .with_endpoint("http://example.com/api/chat")
            .with_model("llama3")
            .with_chunking(1000, 50)
            .with_max_concurrency(8);
        assert_eq!(config.endpoint, "http://example.com/api/chat");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.max_chunk_chars, 1000);
        assert_eq!(config.overlap_chars, 50);
        assert_eq!(config.max_concurrency, Some(8));
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
