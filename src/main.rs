use clap::Parser;
use tokio_util::sync::CancellationToken;

use veo_studio::cli::{self, Args, Command};
use veo_studio::config::{self, Config};

fn load_env() {
    // Load .env file, don't override existing env vars
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

/// Load the config file.
/// If --config is specified the file must exist; otherwise fall back to
/// defaults when the default config is missing or unreadable.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, String> {
    match path {
        Some(path) => Config::load_from_explicit(path.to_path_buf()).map_err(|e| e.to_string()),
        None => match Config::load(None) {
            Ok(c) => Ok(c),
            Err(e) => {
                eprintln!("Warning: {}", e);
                eprintln!("Using default settings.\n");
                Ok(Config::default())
            }
        },
    }
}

fn run(args: Args) -> Result<(), String> {
    let config_path = args.config.clone().unwrap_or_else(config::default_path);

    match args.command {
        Command::Config { action } => {
            let cfg = load_config(args.config.as_deref())?;
            cli::handle_config_action(action, &cfg, &config_path)
        }
        Command::Artifacts { action } => {
            let cfg = load_config(args.config.as_deref())?;
            cli::handle_artifacts_action(action, &cfg.artifact_store())
        }
        Command::Generate(generate_args) => {
            let cfg = load_config(args.config.as_deref())?;

            let cancel = CancellationToken::new();
            let handler_token = cancel.clone();
            ctrlc::set_handler(move || {
                eprintln!("\nCancelling...");
                handler_token.cancel();
            })
            .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

            cli::run_generate(generate_args, cfg, cancel)
        }
    }
}

fn main() {
    // Load .env file before anything else
    load_env();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
