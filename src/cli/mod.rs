//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;
mod generate;

pub use args::{Args, ArtifactsAction, Command, ConfigAction, GenerateArgs};
pub use commands::{format_size, handle_artifacts_action, handle_config_action, init_config_file};
pub use enums::{AspectRatioArg, ResolutionArg};
pub use generate::{
    apply_overrides, build_request, generate_single, parse_batch_prompts, run_batch,
    run_generate, BatchSummary,
};
