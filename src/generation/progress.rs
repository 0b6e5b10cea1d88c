//! Progress events and the cyclic status message sequence.

/// Status messages shown while a job runs.
///
/// Index 0 is announced when the job starts; the k-th status check shows
/// index `k % len`, so long jobs cycle through the list.
pub const LOADING_MESSAGES: &[&str] = &[
    "Warming up the video engine...",
    "Composing the opening frames...",
    "Teaching pixels how to move...",
    "Rendering light and shadow...",
    "Syncing motion across frames...",
    "Adding the finishing touches...",
    "Still working, good things take time...",
];

/// Announced once the job has finished and the file is being fetched.
pub const DOWNLOAD_MESSAGE: &str = "Downloading your video...";

/// Lifecycle phase a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Starting,
    /// `poll` is 1-based.
    Polling { poll: u32 },
    Downloading,
}

/// A human-readable status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    pub message: String,
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Deterministic, wrapping message sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMessages {
    messages: Vec<String>,
}

impl Default for ProgressMessages {
    fn default() -> Self {
        Self {
            messages: LOADING_MESSAGES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl ProgressMessages {
    /// Use a custom message list. An empty list falls back to the defaults.
    pub fn new(messages: Vec<String>) -> Self {
        if messages.is_empty() {
            return Self::default();
        }
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Message at `index`, wrapping modulo the list length.
    pub fn at(&self, index: usize) -> &str {
        &self.messages[index % self.messages.len()]
    }

    pub(crate) fn starting(&self) -> ProgressEvent {
        ProgressEvent {
            stage: ProgressStage::Starting,
            message: self.at(0).to_string(),
        }
    }

    pub(crate) fn polling(&self, poll: u32) -> ProgressEvent {
        ProgressEvent {
            stage: ProgressStage::Polling { poll },
            message: self.at(poll as usize).to_string(),
        }
    }

    pub(crate) fn downloading(&self) -> ProgressEvent {
        ProgressEvent {
            stage: ProgressStage::Downloading,
            message: DOWNLOAD_MESSAGE.to_string(),
        }
    }
}
