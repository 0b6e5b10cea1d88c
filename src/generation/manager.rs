//! GenerationManager - drives one request through submit, poll, and download.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::artifact::{ArtifactStore, VideoArtifact};
use super::error::{ErrorKind, GenerationError};
use super::progress::{ProgressEvent, ProgressMessages};
use super::provider::{GenerationOperation, ProviderError, VideoProvider};
use super::request::GenerationRequest;

/// Default delay between status checks (10 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Tunables for the polling loop.
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    pub poll_interval: Duration,
    /// Give up once this much time has passed since submission.
    /// `None` polls until the job finishes or the caller cancels.
    pub poll_timeout: Option<Duration>,
    pub messages: ProgressMessages,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: None,
            messages: ProgressMessages::default(),
        }
    }
}

/// Where the manager is in the lifecycle of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Submitting,
    /// `polls` status checks have completed so far.
    Polling { polls: u32 },
    Downloading,
    Succeeded,
    Failed(ErrorKind),
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Succeeded | GenerationState::Failed(_))
    }

    /// True while a request is in flight; submission controls stay disabled.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            GenerationState::Submitting
                | GenerationState::Polling { .. }
                | GenerationState::Downloading
        )
    }
}

/// Lifecycle manager for video generation requests.
///
/// `generate` borrows the manager mutably, so a single manager never runs two
/// operations at once.
#[derive(Debug)]
pub struct GenerationManager<P> {
    provider: P,
    store: ArtifactStore,
    options: LifecycleOptions,
    state: GenerationState,
}

impl<P: VideoProvider> GenerationManager<P> {
    pub fn new(provider: P, store: ArtifactStore) -> Self {
        Self::with_options(provider, store, LifecycleOptions::default())
    }

    pub fn with_options(provider: P, store: ArtifactStore, options: LifecycleOptions) -> Self {
        Self {
            provider,
            store,
            options,
            state: GenerationState::Idle,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn options(&self) -> &LifecycleOptions {
        &self.options
    }

    /// Run one request to completion.
    ///
    /// Progress events are delivered to `on_progress` in order: the start
    /// message, one message per status check, then the download message.
    /// `cancel` is honoured at every suspension point.
    ///
    /// # Errors
    ///
    /// Returns a `GenerationError` whose `Display` is suitable for the user.
    /// The manager ends in `GenerationState::Failed` with the matching kind.
    pub async fn generate<F>(
        &mut self,
        request: GenerationRequest,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<VideoArtifact, GenerationError>
    where
        F: FnMut(ProgressEvent),
    {
        self.state = GenerationState::Idle;

        let result = self.run(request, cancel, &mut on_progress).await;

        match &result {
            Ok(artifact) => {
                self.state = GenerationState::Succeeded;
                log::info!(
                    "Video ready: {} ({} bytes)",
                    artifact.path().display(),
                    artifact.size_bytes()
                );
            }
            Err(e) => {
                self.state = GenerationState::Failed(e.kind());
                match e.provider_error() {
                    Some(cause) => log::error!("{} Cause: {}", e, cause),
                    None => log::error!("{}", e),
                }
            }
        }

        result
    }

    async fn run<F>(
        &mut self,
        request: GenerationRequest,
        cancel: &CancellationToken,
        on_progress: &mut F,
    ) -> Result<VideoArtifact, GenerationError>
    where
        F: FnMut(ProgressEvent),
    {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        // Step 1: submit
        self.state = GenerationState::Submitting;
        on_progress(self.options.messages.starting());
        log::info!(
            "Submitting generation request to {} (image: {}, sound: {})",
            self.provider.name(),
            request.image().is_some(),
            request.sound_enabled()
        );

        let submitted = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            result = self.provider.submit(&request) => result,
        };
        let mut operation =
            submitted.map_err(|source| GenerationError::SubmissionFailed { source })?;
        drop(request);
        log::info!("Generation submitted: {}", operation.name);

        // Step 2: poll until the job reports completion
        self.state = GenerationState::Polling { polls: 0 };
        let started = Instant::now();
        let mut poll: u32 = 0;

        while !operation.done {
            if let Some(limit) = self.options.poll_timeout {
                if started.elapsed() >= limit {
                    log::warn!("Gave up on {} after {:?}", operation.name, limit);
                    return Err(GenerationError::TimedOut);
                }
            }

            poll += 1;
            on_progress(self.options.messages.polling(poll));

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                _ = tokio::time::sleep(self.options.poll_interval) => {}
            }

            let refreshed = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                result = self.provider.poll(&operation) => result,
            };
            operation = refreshed.map_err(|source| GenerationError::PollFailed { source })?;
            self.state = GenerationState::Polling { polls: poll };
            log::debug!(
                "Status check {} for {}: done={}",
                poll,
                operation.name,
                operation.done
            );
        }

        let artifact_id = ArtifactStore::artifact_id(&operation.name);
        let locator = result_locator(operation)?;

        // Step 3: download
        self.state = GenerationState::Downloading;
        on_progress(self.options.messages.downloading());
        log::debug!("Downloading video from: {}", locator);

        self.store
            .ensure_dir_exists()
            .map_err(|e| GenerationError::DownloadFailed {
                source: ProviderError::Io(e),
            })?;
        let dest = self.store.path_for(&artifact_id);

        let downloaded = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.provider.download(&locator, &dest) => Some(result),
        };

        match downloaded {
            Some(Ok(size_bytes)) => Ok(self.store.artifact(artifact_id, size_bytes, &locator)),
            Some(Err(source)) => {
                self.store.discard(&artifact_id);
                Err(GenerationError::DownloadFailed { source })
            }
            None => {
                self.store.discard(&artifact_id);
                Err(GenerationError::Cancelled)
            }
        }
    }
}

/// Extract the download locator from a finished operation.
fn result_locator(operation: GenerationOperation) -> Result<String, GenerationError> {
    if let Some(error) = operation.error {
        return Err(GenerationError::OperationFailed {
            message: error.message,
        });
    }

    match operation.result_uri {
        Some(uri) if !uri.trim().is_empty() => Ok(uri),
        _ => Err(GenerationError::MissingResult),
    }
}
