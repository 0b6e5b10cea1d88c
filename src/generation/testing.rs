//! Scripted in-memory provider for lifecycle tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::provider::{GenerationOperation, ProviderError, VideoProvider};
use super::request::GenerationRequest;

pub(crate) const OPERATION_NAME: &str = "models/veo/operations/test-op";

/// Replays queued responses. Once the poll queue is exhausted every status
/// check reports a still-running job.
pub(crate) struct ScriptedProvider {
    submit: Mutex<Option<Result<GenerationOperation, ProviderError>>>,
    polls: Mutex<VecDeque<Result<GenerationOperation, ProviderError>>>,
    download: Mutex<Option<Result<Vec<u8>, ProviderError>>>,
    submit_delay: Duration,
    poll_delay: Duration,
    /// Applied after the bytes are written, so a partial file exists meanwhile.
    download_delay: Duration,
    pub submit_calls: AtomicUsize,
    pub poll_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub poll_times: Mutex<Vec<Instant>>,
    pub submitted_prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(submit: Result<GenerationOperation, ProviderError>) -> Self {
        Self {
            submit: Mutex::new(Some(submit)),
            polls: Mutex::new(VecDeque::new()),
            download: Mutex::new(Some(Ok(b"fake-mp4-bytes".to_vec()))),
            submit_delay: Duration::ZERO,
            poll_delay: Duration::ZERO,
            download_delay: Duration::ZERO,
            submit_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            poll_times: Mutex::new(Vec::new()),
            submitted_prompts: Mutex::new(Vec::new()),
        }
    }

    /// Submit returns a pending handle.
    pub fn pending() -> Self {
        Self::new(Ok(GenerationOperation::pending(OPERATION_NAME)))
    }

    /// Submit returns an already finished handle.
    pub fn immediate() -> Self {
        Self::new(Ok(GenerationOperation::completed(
            OPERATION_NAME,
            "https://files.example.com/video.mp4?alt=media",
        )))
    }

    pub fn then_poll(self, response: Result<GenerationOperation, ProviderError>) -> Self {
        self.polls.lock().unwrap().push_back(response);
        self
    }

    pub fn with_download(self, response: Result<Vec<u8>, ProviderError>) -> Self {
        *self.download.lock().unwrap() = Some(response);
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = delay;
        self
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOperation, ProviderError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted_prompts
            .lock()
            .unwrap()
            .push(request.prompt().to_string());
        pause(self.submit_delay).await;
        self.submit
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(GenerationOperation::pending(OPERATION_NAME)))
    }

    async fn poll(
        &self,
        operation: &GenerationOperation,
    ) -> Result<GenerationOperation, ProviderError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_times.lock().unwrap().push(Instant::now());
        pause(self.poll_delay).await;
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenerationOperation::pending(operation.name.clone())))
    }

    async fn download(&self, _locator: &str, dest: &Path) -> Result<u64, ProviderError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .download
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(b"fake-mp4-bytes".to_vec()));

        let bytes = response?;
        std::fs::write(dest, &bytes)?;
        pause(self.download_delay).await;
        Ok(bytes.len() as u64)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
