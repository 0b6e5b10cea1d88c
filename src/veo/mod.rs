//! Gemini API (Veo) adapter.
//!
//! The wire format of the long-running video endpoint lives here and nowhere
//! else; the lifecycle manager only sees the `VideoProvider` trait.

mod client;

pub use client::{VeoClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

use crate::config::{Config, API_KEY_ENV};
use crate::generation::{GenerationError, GenerationManager, ProviderError};

/// Build a manager backed by a [`VeoClient`] from resolved configuration.
///
/// # Errors
///
/// Returns `GenerationError::MissingCredential` when no API key is configured.
/// No network activity happens before this check.
pub fn manager_from_config(config: &Config) -> Result<GenerationManager<VeoClient>, GenerationError> {
    manager_from_config_with(config, |name| std::env::var(name).ok())
}

/// Like [`manager_from_config`] with an injectable environment lookup.
pub fn manager_from_config_with<F>(
    config: &Config,
    env: F,
) -> Result<GenerationManager<VeoClient>, GenerationError>
where
    F: Fn(&str) -> Option<String>,
{
    let missing = || GenerationError::MissingCredential {
        env_var: API_KEY_ENV.to_string(),
    };

    let api_key = config.resolve_api_key_with(env).ok_or_else(missing)?;
    let client = VeoClient::new(api_key, config.base_url(), config.model()).map_err(|e| match e {
        ProviderError::MissingApiKey => missing(),
        other => GenerationError::SubmissionFailed { source: other },
    })?;

    log::debug!("Using {} at {}", client.model(), client.base_url());

    Ok(GenerationManager::with_options(
        client,
        config.artifact_store(),
        config.lifecycle_options(),
    ))
}
