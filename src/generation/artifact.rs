//! Artifact store - where downloaded videos live until the caller releases them.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// MIME type of every stored artifact.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

const VIDEO_EXTENSION: &str = "mp4";

/// A downloaded, locally playable video.
///
/// Owned by the caller once handed off. Dropping it leaves the file in place;
/// call [`VideoArtifact::release`] to delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    id: String,
    path: PathBuf,
    size_bytes: u64,
    source_uri: String,
}

impl VideoArtifact {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn mime_type(&self) -> &'static str {
        VIDEO_MIME_TYPE
    }

    /// The remote locator the video was fetched from.
    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    /// Copy the video to `dest`, creating parent directories.
    pub fn save_as(&self, dest: &Path) -> Result<PathBuf, std::io::Error> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::copy(&self.path, dest)?;
        Ok(dest.to_path_buf())
    }

    /// Delete the underlying file. A file that is already gone is not an error.
    pub fn release(self) -> Result<(), std::io::Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("Released artifact {}", self.id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Entry returned by [`ArtifactStore::list_entries`].
#[derive(Debug, Clone)]
pub struct ArtifactEntry {
    pub id: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Directory of downloaded videos, one `<id>.mp4` file per job.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`. Does not create the directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default directory: `<cache dir>/veo-studio/videos`.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("veo-studio")
            .join("videos")
    }

    /// Create a store and ensure its directory exists.
    pub fn new_initialized(dir: PathBuf) -> Result<Self, std::io::Error> {
        let store = Self::new(dir);
        store.ensure_dir_exists()?;
        Ok(store)
    }

    pub fn ensure_dir_exists(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic id for a provider operation name.
    ///
    /// 32 hex chars (first 16 bytes of SHA-256).
    pub fn artifact_id(operation_name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(operation_name.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }

    /// File path an artifact with `id` is stored at.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, VIDEO_EXTENSION))
    }

    /// Wrap a file that has been written to [`ArtifactStore::path_for`].
    pub(crate) fn artifact(
        &self,
        id: String,
        size_bytes: u64,
        source_uri: &str,
    ) -> VideoArtifact {
        VideoArtifact {
            path: self.path_for(&id),
            id,
            size_bytes,
            source_uri: source_uri.to_string(),
        }
    }

    /// Remove a partially written file, ignoring errors.
    pub(crate) fn discard(&self, id: &str) {
        let path = self.path_for(id);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("Failed to remove partial download {}: {}", path.display(), e);
            }
        }
    }

    /// All stored videos, sorted by id.
    pub fn list_entries(&self) -> Result<Vec<ArtifactEntry>, std::io::Error> {
        let mut entries = Vec::new();

        if !self.dir.exists() {
            return Ok(entries);
        }

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some(VIDEO_EXTENSION) {
                continue;
            }

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_string();

            entries.push(ArtifactEntry {
                id,
                size_bytes: metadata.len(),
                path,
            });
        }

        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(entries)
    }

    /// Total size of stored videos in bytes.
    pub fn total_size_bytes(&self) -> Result<u64, std::io::Error> {
        Ok(self.list_entries()?.iter().map(|e| e.size_bytes).sum())
    }

    /// Remove a stored video by id. Returns whether a file was removed.
    pub fn remove(&self, id: &str) -> Result<bool, std::io::Error> {
        let path = self.path_for(id);
        if path.exists() {
            std::fs::remove_file(&path)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Remove every stored video. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize, std::io::Error> {
        let mut removed = 0;
        for entry in self.list_entries()? {
            std::fs::remove_file(&entry.path)?;
            removed += 1;
        }
        Ok(removed)
    }
}
