//! GenerationSession - the entry point a front end talks to.
//!
//! Holds the most recent artifact and releases it when the next generation
//! starts, so only one video per session is kept on disk.

use tokio_util::sync::CancellationToken;

use super::artifact::VideoArtifact;
use super::error::GenerationError;
use super::manager::{GenerationManager, GenerationState};
use super::progress::ProgressEvent;
use super::provider::VideoProvider;
use super::request::GenerationRequest;

pub struct GenerationSession<P> {
    manager: GenerationManager<P>,
    current: Option<VideoArtifact>,
}

impl<P: VideoProvider> GenerationSession<P> {
    pub fn new(manager: GenerationManager<P>) -> Self {
        Self {
            manager,
            current: None,
        }
    }

    pub fn manager(&self) -> &GenerationManager<P> {
        &self.manager
    }

    pub fn state(&self) -> GenerationState {
        self.manager.state()
    }

    /// The artifact from the last successful generation, if still held.
    pub fn current(&self) -> Option<&VideoArtifact> {
        self.current.as_ref()
    }

    /// Generate a video, replacing (and releasing) the previous one.
    pub async fn submit<F>(
        &mut self,
        request: GenerationRequest,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<&VideoArtifact, GenerationError>
    where
        F: FnMut(ProgressEvent),
    {
        if let Err(e) = self.release() {
            log::warn!("Failed to release previous video: {}", e);
        }

        let artifact = self.manager.generate(request, cancel, on_progress).await?;
        let held = self.current.insert(artifact);
        Ok(&*held)
    }

    /// Hand the current artifact to the caller without deleting it.
    pub fn take(&mut self) -> Option<VideoArtifact> {
        self.current.take()
    }

    /// Delete the current artifact, if any.
    pub fn release(&mut self) -> Result<(), std::io::Error> {
        match self.current.take() {
            Some(artifact) => artifact.release(),
            None => Ok(()),
        }
    }
}
