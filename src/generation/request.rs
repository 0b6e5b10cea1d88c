//! GenerationRequest - validated, provider-agnostic description of one video job.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Prefix every accepted reference image MIME type must carry.
const IMAGE_MIME_PREFIX: &str = "image/";

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// The ratio as the provider spells it ("16:9" / "9:16").
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "720p")]
    Hd720p,
    #[serde(rename = "1080p")]
    FullHd1080p,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hd720p => "720p",
            Resolution::FullHd1080p => "1080p",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference image sent inline with the request.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ReferenceImage {
    /// Wrap raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::NotAnImage` if `mime_type` is not an `image/*` type.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Result<Self, RequestError> {
        let mime_type = mime_type.into();
        if !mime_type.to_ascii_lowercase().starts_with(IMAGE_MIME_PREFIX) {
            return Err(RequestError::NotAnImage { mime_type });
        }
        Ok(Self { bytes, mime_type })
    }

    /// Load an image from disk, deriving the MIME type from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, RequestError> {
        let mime_type = mime_type_for_path(path);
        // Reject before reading so a large video file is never loaded
        if !mime_type.starts_with(IMAGE_MIME_PREFIX) {
            return Err(RequestError::NotAnImage {
                mime_type: mime_type.to_string(),
            });
        }

        let bytes = std::fs::read(path).map_err(|e| RequestError::ImageRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::new(bytes, mime_type)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

impl std::fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guess a MIME type from a file extension.
///
/// Unknown extensions map to `application/octet-stream`, which the image
/// check rejects.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "application/octet-stream",
    }
}

/// Validate a prompt before it is turned into a request.
///
/// # Errors
///
/// Returns `RequestError::EmptyPrompt` for empty or whitespace-only prompts.
pub fn validate_prompt(prompt: &str) -> Result<(), RequestError> {
    if prompt.trim().is_empty() {
        return Err(RequestError::EmptyPrompt);
    }
    Ok(())
}

/// A validated generation request.
///
/// Only constructible through [`GenerationRequestBuilder::build`], so the
/// prompt is always non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    image: Option<ReferenceImage>,
    aspect_ratio: AspectRatio,
    resolution: Resolution,
    sound_enabled: bool,
}

impl GenerationRequest {
    pub fn builder(prompt: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder {
            prompt: prompt.into(),
            image: None,
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            sound_enabled: true,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image(&self) -> Option<&ReferenceImage> {
        self.image.as_ref()
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }
}

/// Builder for [`GenerationRequest`]. Sound defaults to on.
#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    prompt: String,
    image: Option<ReferenceImage>,
    aspect_ratio: AspectRatio,
    resolution: Resolution,
    sound_enabled: bool,
}

impl GenerationRequestBuilder {
    pub fn image(mut self, image: ReferenceImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn maybe_image(mut self, image: Option<ReferenceImage>) -> Self {
        self.image = image;
        self
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn sound(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// Validate and produce the request.
    pub fn build(self) -> Result<GenerationRequest, RequestError> {
        validate_prompt(&self.prompt)?;
        Ok(GenerationRequest {
            prompt: self.prompt,
            image: self.image,
            aspect_ratio: self.aspect_ratio,
            resolution: self.resolution,
            sound_enabled: self.sound_enabled,
        })
    }
}

/// Local validation failures, raised before any provider call.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,

    #[error("Please upload a valid image file.")]
    NotAnImage {
        /// The rejected MIME type
        mime_type: String,
    },

    #[error("Failed to read the image file.")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
