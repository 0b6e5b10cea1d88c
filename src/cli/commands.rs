//! Subcommand handlers for artifacts and config actions.

use std::path::Path;

use super::args::{ArtifactsAction, ConfigAction};
use crate::config::{Config, API_KEY_ENV, DEFAULT_CONFIG_TEMPLATE};
use crate::generation::ArtifactStore;

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Handle artifacts subcommand actions.
pub fn handle_artifacts_action(action: ArtifactsAction, store: &ArtifactStore) -> Result<(), String> {
    match action {
        ArtifactsAction::List => {
            let entries = store
                .list_entries()
                .map_err(|e| format!("Failed to list videos: {}", e))?;

            if entries.is_empty() {
                println!("No downloaded videos in {}", store.dir().display());
                return Ok(());
            }

            println!("Downloaded videos:\n");
            for entry in &entries {
                println!(
                    "  {} {:>10}  {}",
                    entry.id,
                    format_size(entry.size_bytes),
                    entry.path.display()
                );
            }

            let total_size = store
                .total_size_bytes()
                .map_err(|e| format!("Failed to calculate total size: {}", e))?;
            println!("\nTotal: {} videos, {}", entries.len(), format_size(total_size));
            Ok(())
        }
        ArtifactsAction::Clear { id } => {
            match id {
                Some(id) => {
                    let removed = store
                        .remove(&id)
                        .map_err(|e| format!("Failed to remove video: {}", e))?;

                    if removed {
                        println!("Removed video: {}", id);
                    } else {
                        println!("No video found with id: {}", id);
                    }
                }
                None => {
                    let count = store
                        .clear()
                        .map_err(|e| format!("Failed to clear videos: {}", e))?;

                    if count == 0 {
                        println!("No downloaded videos to remove.");
                    } else {
                        println!("Removed {} video{}.", count, if count == 1 { "" } else { "s" });
                    }
                }
            }
            Ok(())
        }
    }
}

/// Describe where the usable API key comes from, if any.
/// Blank keys count as missing, matching what generation accepts.
fn api_key_status<F>(config: &Config, env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if config.resolve_api_key_with(|_| None).is_some() {
        "set (config file)".to_string()
    } else if config.resolve_api_key_with(env).is_some() {
        format!("set (${})", API_KEY_ENV)
    } else {
        "not set".to_string()
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config: &Config,
    config_path: &Path,
) -> Result<(), String> {
    match action {
        ConfigAction::Show => {
            let api_key = api_key_status(config, |name| std::env::var(name).ok());
            let timeout = config
                .generation
                .poll_timeout_secs
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "none".to_string());

            println!("Current configuration:");
            println!("  API key: {}", api_key);
            println!("  Base URL: {}", config.base_url());
            println!("  Model: {}", config.model());
            println!("  Poll interval: {}s", config.generation.poll_interval_secs);
            println!("  Poll timeout: {}", timeout);
            println!(
                "  Sound: {}",
                if config.generation.sound { "yes" } else { "no" }
            );
            println!("  Aspect ratio: {}", config.generation.aspect_ratio);
            println!("  Resolution: {}", config.generation.resolution);
            println!("  Video dir: {}", config.artifact_dir().display());
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            init_config_file(config_path)?;
            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

/// Write the default config template, refusing to overwrite an existing file.
pub fn init_config_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!(
            "Config file already exists: {}\nUse 'veo-studio config show' to view current settings.",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Error creating config directory: {}", e))?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .map_err(|e| format!("Error writing config file: {}", e))
}
