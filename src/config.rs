//! Configuration file handling for veo-studio.
//!
//! Loads configuration from `<config dir>/veo-studio/config.toml` or a custom path.
//! Precedence is CLI args > config file > built-in defaults. The API key may
//! also come from the `GEMINI_API_KEY` environment variable.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::generation::{
    ArtifactStore, AspectRatio, LifecycleOptions, Resolution, DEFAULT_POLL_INTERVAL,
};
use crate::veo::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration file structure for veo-studio.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ProviderConfig {
    /// Takes precedence over `GEMINI_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Unset means poll until the job finishes or is cancelled.
    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub resolution: Resolution,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: None,
            sound: true,
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OutputConfig {
    /// Where downloaded videos are kept (default: user cache dir).
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::read(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a path the user named explicitly.
    /// Unlike [`Config::load`], a missing file is an error.
    pub fn load_from_explicit(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        Self::read(&path)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// API key from the config file, falling back to `GEMINI_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Like [`Config::resolve_api_key`] with an injectable environment lookup.
    pub fn resolve_api_key_with<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: String| {
            let key = key.trim().to_string();
            if key.is_empty() {
                None
            } else {
                Some(key)
            }
        };

        self.provider
            .api_key
            .clone()
            .and_then(non_blank)
            .or_else(|| env(API_KEY_ENV).and_then(non_blank))
    }

    pub fn base_url(&self) -> String {
        self.provider
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn model(&self) -> String {
        self.provider
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn lifecycle_options(&self) -> LifecycleOptions {
        LifecycleOptions {
            // A zero interval would hammer the status endpoint
            poll_interval: Duration::from_secs(self.generation.poll_interval_secs.max(1)),
            poll_timeout: self.generation.poll_timeout_secs.map(Duration::from_secs),
            ..LifecycleOptions::default()
        }
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.output
            .artifact_dir
            .clone()
            .unwrap_or_else(ArtifactStore::default_dir)
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(self.artifact_dir())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("veo-studio")
        .join("config.toml")
}

/// Contents written by `veo-studio config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# veo-studio configuration

[provider]
# API key (default: $GEMINI_API_KEY)
# api_key = "your-api-key"
# base_url = "https://generativelanguage.googleapis.com/v1beta"
# model = "veo-3.0-generate-preview"

[generation]
# Seconds between status checks
poll_interval_secs = 10
# Give up after this many seconds (default: poll until done or Ctrl+C)
# poll_timeout_secs = 900
# Generate an audio track
sound = true
# "16:9" or "9:16" (not yet sent to the provider)
aspect_ratio = "16:9"
# "720p" or "1080p" (not yet sent to the provider)
resolution = "720p"

[output]
# Where downloaded videos are kept (default: user cache dir)
# artifact_dir = "/path/to/videos"
"#;
