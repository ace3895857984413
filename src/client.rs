//! HTTP client for the Ollama-style chat completion backend.
//!
//! The pipeline treats the summarization backend as an opaque remote
//! capability: one non-streaming chat request carrying a system and a user
//! message, one generated string back. Every transport- or protocol-level
//! failure is folded into the closed [`InferenceError`] taxonomy; callers
//! never see raw `reqwest` errors.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::PipelineConfig;
use crate::message::Message;

// ── Error taxonomy ─────────────────────────────────────────────────────

/// Classified failure of a single inference call.
///
/// The taxonomy is closed on purpose: the retry controller treats every
/// variant identically, and the variants exist so logs and outcomes describe
/// what actually went wrong.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The request exceeded its timeout. Inference can be slow; timeouts are
    /// retryable up to the configured budget.
    #[error("inference request timed out")]
    Timeout,

    /// The backend could not be reached at the transport level.
    #[error("could not connect to inference backend: {0}")]
    ConnectionFailure(String),

    /// The backend answered with a non-2xx status.
    #[error("inference backend returned HTTP {status}")]
    HttpError {
        /// The HTTP status code of the response.
        status: u16,
    },

    /// The response body did not match the expected chat completion shape.
    #[error("malformed inference response: {0}")]
    ProtocolError(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout
        } else if let Some(status) = err.status() {
            InferenceError::HttpError {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            InferenceError::ProtocolError(err.to_string())
        } else {
            InferenceError::ConnectionFailure(err.to_string())
        }
    }
}

// ── Wire types ─────────────────────────────────────────────────────────

/// Request body for the `/api/chat` endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    stream: bool,
}

/// Response body of a non-streaming chat completion.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

// ── Client ─────────────────────────────────────────────────────────────

/// Shared client for chat completion requests.
///
/// Holds one `reqwest::Client` (and thus one connection pool) that tolerates
/// concurrent use across all in-flight chunk summarizations.
#[derive(Clone, Debug)]
pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: Url,
    model: String,
    request_timeout: Duration,
}

impl InferenceClient {
    /// Builds a client from the pipeline configuration.
    ///
    /// Fails when the endpoint is not a valid URL or the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: &PipelineConfig) -> Result<Self, crate::config::ConfigError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|source| {
            crate::config::ConfigError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                source,
            }
        })?;
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|err| crate::config::ConfigError::HttpClient(err.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            model: config.model.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// The configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one non-streaming chat completion and returns the generated text.
    ///
    /// `system` and `user` become the two role-tagged messages of the request.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![Message::system(system), Message::user(user)],
            stream: false,
        };

        tracing::debug!(model = %self.model, endpoint = %self.endpoint, "sending chat completion request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .timeout(self.request_timeout)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let status = response.status().as_u16();
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| InferenceError::ProtocolError(err.to_string()))?;

        tracing::debug!(status, chars = body.message.content.len(), "received chat completion");
        Ok(body.message.content)
    }
}
