//! Video generation lifecycle.
//!
//! A validated [`GenerationRequest`] is handed to a [`GenerationManager`], which
//! submits it through a [`VideoProvider`], polls the returned operation until it
//! finishes, and downloads the result into an [`ArtifactStore`]. Progress is
//! reported as [`ProgressEvent`]s; failures as a classified [`GenerationError`].

mod artifact;
mod error;
mod manager;
mod progress;
mod provider;
mod request;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use artifact::{ArtifactEntry, ArtifactStore, VideoArtifact, VIDEO_MIME_TYPE};
pub use error::{ErrorKind, GenerationError};
pub use manager::{GenerationManager, GenerationState, LifecycleOptions, DEFAULT_POLL_INTERVAL};
pub use progress::{
    ProgressEvent, ProgressMessages, ProgressStage, DOWNLOAD_MESSAGE, LOADING_MESSAGES,
};
pub use provider::{GenerationOperation, OperationError, ProviderError, VideoProvider};
pub use request::{
    mime_type_for_path, validate_prompt, AspectRatio, GenerationRequest,
    GenerationRequestBuilder, ReferenceImage, RequestError, Resolution,
};
pub use session::GenerationSession;
