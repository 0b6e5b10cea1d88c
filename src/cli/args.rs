//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{AspectRatioArg, ResolutionArg};

/// Generate videos from text prompts with Veo
#[derive(Parser, Debug)]
#[command(name = "veo-studio")]
#[command(version, about = "Generate videos from text prompts with Veo", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a video from a text prompt
    #[command(after_help = "EXAMPLES:
    veo-studio generate \"a red ball bouncing on a beach\"
    veo-studio generate \"the cat starts dancing\" --image cat.png --no-sound
    veo-studio generate --batch prompts.txt --output videos/

ENVIRONMENT:
    GEMINI_API_KEY    Your Gemini API key (unless set in the config file).")]
    Generate(GenerateArgs),
    /// Manage downloaded videos
    Artifacts {
        #[command(subcommand)]
        action: ArtifactsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// The text prompt describing the video to generate
    #[arg(required_unless_present = "batch")]
    pub prompt: Option<String>,

    /// File with one prompt per line for batch generation
    #[arg(long, short = 'b', conflicts_with = "prompt")]
    pub batch: Option<PathBuf>,

    /// Reference image to animate
    #[arg(long, short)]
    pub image: Option<PathBuf>,

    /// Output aspect ratio (default: config or 16:9)
    #[arg(long)]
    pub aspect_ratio: Option<AspectRatioArg>,

    /// Output resolution (default: config or 720p)
    #[arg(long)]
    pub resolution: Option<ResolutionArg>,

    /// Generate without an audio track
    #[arg(long)]
    pub no_sound: bool,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Copy the video here (a directory with --batch)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ArtifactsAction {
    /// List downloaded videos with sizes
    List,
    /// Delete downloaded videos (all or by id)
    Clear {
        /// Specific video id to delete (deletes all if not provided)
        id: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
