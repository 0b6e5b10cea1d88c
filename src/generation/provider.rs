//! Provider capability - the submit/poll/download contract the manager depends on.

use std::path::Path;

use async_trait::async_trait;

use super::request::GenerationRequest;

/// Error detail reported by the provider for a failed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub code: Option<i64>,
    pub message: String,
}

/// Handle to a remote asynchronous generation job.
///
/// Refreshed by polling until `done` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOperation {
    /// Provider-side identifier, used to address status checks.
    pub name: String,
    pub done: bool,
    pub error: Option<OperationError>,
    /// Download locator of the first generated video, once available.
    pub result_uri: Option<String>,
}

impl GenerationOperation {
    /// A handle for a job that has not finished yet.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            error: None,
            result_uri: None,
        }
    }

    /// A finished job with a download locator.
    pub fn completed(name: impl Into<String>, result_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            error: None,
            result_uri: Some(result_uri.into()),
        }
    }

    /// A finished job that the provider reports as failed.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            error: Some(OperationError {
                code: None,
                message: message.into(),
            }),
            result_uri: None,
        }
    }
}

/// Remote video generation capability.
///
/// Implemented by the HTTP adapter in `veo::client` and by test doubles.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Provider name, for logging.
    fn name(&self) -> &str;

    /// Start a generation job.
    async fn submit(&self, request: &GenerationRequest)
        -> Result<GenerationOperation, ProviderError>;

    /// Refresh a job handle.
    async fn poll(&self, operation: &GenerationOperation)
        -> Result<GenerationOperation, ProviderError>;

    /// Fetch the generated video at `locator` into `dest`.
    ///
    /// Returns the number of bytes written.
    async fn download(&self, locator: &str, dest: &Path) -> Result<u64, ProviderError>;
}

/// Errors raised by a provider adapter.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Retry-After header value in seconds, if provided
        retry_after_secs: Option<u64>,
    },

    #[error("Content policy violation: {message}")]
    ContentPolicyViolation { message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
