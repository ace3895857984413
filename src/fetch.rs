//! Document source collaborators.
//!
//! The pipeline consumes already-extracted document text; where that text
//! comes from is an I/O adapter behind [`DocumentSource`]. Two adapters ship
//! here: [`RemoteTextSource`] downloads a document over HTTP and validates
//! its content type, [`LocalTextSource`] reads an extracted text file from
//! disk. Byte-level format extraction (PDF parsing and friends) stays behind
//! the trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Failure to obtain document text from a source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The referenced document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The source refused access to the document.
    #[error("permission denied for document: {0}")]
    PermissionDenied(String),

    /// The document exists but is not the expected content type.
    #[error("unexpected content type for {reference}: expected {expected}, found {found}")]
    FormatMismatch {
        /// The document reference.
        reference: String,
        /// The content type the source was configured to accept.
        expected: String,
        /// What the server actually declared.
        found: String,
    },

    /// The reference could not be parsed as a URL.
    #[error("invalid document reference '{reference}': {source}")]
    InvalidReference {
        /// The offending reference.
        reference: String,
        /// Underlying parse error.
        source: url::ParseError,
    },

    /// Transport-level failure while fetching.
    #[error("transport error fetching document: {0}")]
    Transport(String),

    /// Local I/O failure outside the not-found/permission cases.
    #[error("i/o error reading document: {0}")]
    Io(#[from] std::io::Error),
}

/// Provides document text to the pipeline.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches the text behind `reference` (a URL or a local path, depending
    /// on the implementation).
    async fn fetch(&self, reference: &str) -> Result<String, FetchError>;
}

/// Downloads documents over HTTP, validating the declared content type.
///
/// Status codes are classified the way the spec's collaborators expect:
/// 404 → [`FetchError::NotFound`], 401/403 → [`FetchError::PermissionDenied`],
/// a content type other than the expected one → [`FetchError::FormatMismatch`].
#[derive(Clone, Debug)]
pub struct RemoteTextSource {
    http: reqwest::Client,
    expected_content_type: String,
}

impl RemoteTextSource {
    /// Creates a source that accepts responses whose `Content-Type` contains
    /// `expected_content_type` (e.g. `text/plain`).
    #[must_use]
    pub fn new(http: reqwest::Client, expected_content_type: impl Into<String>) -> Self {
        Self {
            http,
            expected_content_type: expected_content_type.into(),
        }
    }
}

#[async_trait]
impl DocumentSource for RemoteTextSource {
    async fn fetch(&self, reference: &str) -> Result<String, FetchError> {
        let url = Url::parse(reference).map_err(|source| FetchError::InvalidReference {
            reference: reference.to_string(),
            source,
        })?;

        tracing::info!(url = %url, "downloading document");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        match response.status().as_u16() {
            404 => return Err(FetchError::NotFound(reference.to_string())),
            401 | 403 => return Err(FetchError::PermissionDenied(reference.to_string())),
            status if status >= 400 => {
                return Err(FetchError::Transport(format!("HTTP {status}")));
            }
            _ => {}
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.contains(&self.expected_content_type) {
            return Err(FetchError::FormatMismatch {
                reference: reference.to_string(),
                expected: self.expected_content_type.clone(),
                found: content_type,
            });
        }

        response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))
    }
}

/// Reads already-extracted document text from the local filesystem.
#[derive(Clone, Debug, Default)]
pub struct LocalTextSource {
    root: Option<PathBuf>,
}

impl LocalTextSource {
    /// Creates a source resolving references relative to the process's
    /// working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source resolving references relative to `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(reference),
            None => Path::new(reference).to_path_buf(),
        }
    }
}

#[async_trait]
impl DocumentSource for LocalTextSource {
    async fn fetch(&self, reference: &str) -> Result<String, FetchError> {
        let path = self.resolve(reference);
        tracing::info!(path = %path.display(), "reading document from disk");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => FetchError::NotFound(reference.to_string()),
                std::io::ErrorKind::PermissionDenied => {
                    FetchError::PermissionDenied(reference.to_string())
                }
                std::io::ErrorKind::InvalidData => FetchError::FormatMismatch {
                    reference: reference.to_string(),
                    expected: "utf-8 text".to_string(),
                    found: "non-utf-8 data".to_string(),
                },
                _ => FetchError::Io(err),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn remote_source_returns_matching_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/paper.txt");
                then.status(200)
                    .header("content-type", "text/plain; charset=utf-8")
                    .body("extracted text");
            })
            .await;

        let source = RemoteTextSource::new(reqwest::Client::new(), "text/plain");
        let text = source.fetch(&server.url("/paper.txt")).await.unwrap();
        assert_eq!(text, "extracted text");
    }

    #[tokio::test]
    async fn remote_source_rejects_wrong_content_type() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200)
                    .header("content-type", "text/html")
                    .body("<html></html>");
            })
            .await;

        let source = RemoteTextSource::new(reqwest::Client::new(), "text/plain");
        let err = source.fetch(&server.url("/page")).await.unwrap_err();
        assert!(matches!(err, FetchError::FormatMismatch { .. }));
    }

    #[tokio::test]
    async fn remote_source_classifies_not_found_and_permission() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/secret");
                then.status(403);
            })
            .await;

        let source = RemoteTextSource::new(reqwest::Client::new(), "text/plain");
        assert!(matches!(
            source.fetch(&server.url("/missing")).await.unwrap_err(),
            FetchError::NotFound(_)
        ));
        assert!(matches!(
            source.fetch(&server.url("/secret")).await.unwrap_err(),
            FetchError::PermissionDenied(_)
        ));
    }

    #[tokio::test]
    async fn local_source_reads_files_and_classifies_missing() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("doc.txt"), "local text")
            .await
            .unwrap();

        let source = LocalTextSource::with_root(dir.path());
        assert_eq!(source.fetch("doc.txt").await.unwrap(), "local text");
        assert!(matches!(
            source.fetch("absent.txt").await.unwrap_err(),
            FetchError::NotFound(_)
        ));
    }
}
