//! GenerationError - terminal failures of a generation, with caller-facing messages.

use super::provider::ProviderError;
use super::request::RequestError;

/// Classification of a failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    InvalidInput,
    SubmissionFailed,
    PollFailed,
    OperationFailed,
    MissingResult,
    DownloadFailed,
    Cancelled,
    TimedOut,
}

/// Terminal failure of a generation.
///
/// `Display` is the message shown to the user; provider details stay
/// reachable through `source()` for logging. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API key is not configured. Set {env_var} or add it to the config file.")]
    MissingCredential {
        /// Environment variable that was consulted
        env_var: String,
    },

    #[error(transparent)]
    InvalidInput(#[from] RequestError),

    #[error("Failed to start video generation. Check your prompt or image and try again.")]
    SubmissionFailed {
        #[source]
        source: ProviderError,
    },

    #[error("Failed to get video generation status.")]
    PollFailed {
        #[source]
        source: ProviderError,
    },

    #[error("Video generation failed: {message}")]
    OperationFailed {
        /// Provider-reported error detail
        message: String,
    },

    #[error("Video generation succeeded, but no download link was provided.")]
    MissingResult,

    #[error("Failed to download the generated video file.")]
    DownloadFailed {
        #[source]
        source: ProviderError,
    },

    #[error("Video generation was cancelled.")]
    Cancelled,

    #[error("Video generation timed out.")]
    TimedOut,
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::MissingCredential { .. } => ErrorKind::MissingCredential,
            GenerationError::InvalidInput(_) => ErrorKind::InvalidInput,
            GenerationError::SubmissionFailed { .. } => ErrorKind::SubmissionFailed,
            GenerationError::PollFailed { .. } => ErrorKind::PollFailed,
            GenerationError::OperationFailed { .. } => ErrorKind::OperationFailed,
            GenerationError::MissingResult => ErrorKind::MissingResult,
            GenerationError::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            GenerationError::Cancelled => ErrorKind::Cancelled,
            GenerationError::TimedOut => ErrorKind::TimedOut,
        }
    }

    /// The provider-level cause, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            GenerationError::SubmissionFailed { source }
            | GenerationError::PollFailed { source }
            | GenerationError::DownloadFailed { source } => Some(source),
            _ => None,
        }
    }
}
