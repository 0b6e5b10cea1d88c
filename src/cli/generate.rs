//! The `generate` command: single and batch video generation.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use super::args::GenerateArgs;
use crate::config::Config;
use crate::generation::{
    ErrorKind, GenerationError, GenerationRequest, GenerationSession, ReferenceImage,
    RequestError, VideoProvider,
};
use crate::veo;

/// Outcome counts of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Fold `generate` flags into the loaded config (CLI args win).
pub fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(aspect_ratio) = args.aspect_ratio {
        config.generation.aspect_ratio = aspect_ratio.into();
    }
    if let Some(resolution) = args.resolution {
        config.generation.resolution = resolution.into();
    }
    if args.no_sound {
        config.generation.sound = false;
    }
    if args.timeout.is_some() {
        config.generation.poll_timeout_secs = args.timeout;
    }
}

/// Build a validated request from a prompt and the effective settings.
pub fn build_request(
    prompt: &str,
    config: &Config,
    image: Option<ReferenceImage>,
) -> Result<GenerationRequest, RequestError> {
    GenerationRequest::builder(prompt)
        .maybe_image(image)
        .aspect_ratio(config.generation.aspect_ratio)
        .resolution(config.generation.resolution)
        .sound(config.generation.sound)
        .build()
}

/// One prompt per line; blank lines and `#` comments are skipped.
pub fn parse_batch_prompts(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Run the `generate` command against the configured Veo endpoint.
pub fn run_generate(
    args: GenerateArgs,
    mut config: Config,
    cancel: CancellationToken,
) -> Result<(), String> {
    apply_overrides(&mut config, &args);

    let image = args
        .image
        .as_deref()
        .map(ReferenceImage::from_path)
        .transpose()
        .map_err(|e| GenerationError::from(e).to_string())?;

    if let Some(batch_file) = &args.batch {
        return run_generate_batch(batch_file, &config, image, args.output, &cancel);
    }

    let prompt = args
        .prompt
        .as_deref()
        .ok_or_else(|| "Either a prompt or --batch file must be provided".to_string())?;
    let request = build_request(prompt, &config, image)
        .map_err(|e| GenerationError::from(e).to_string())?;

    let manager = veo::manager_from_config(&config).map_err(|e| e.to_string())?;
    let mut session = GenerationSession::new(manager);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    rt.block_on(generate_single(&mut session, request, args.output.as_deref(), &cancel))
        .map(|_| ())
}

fn run_generate_batch(
    batch_file: &Path,
    config: &Config,
    image: Option<ReferenceImage>,
    output: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<(), String> {
    let contents = std::fs::read_to_string(batch_file)
        .map_err(|e| format!("Failed to read batch file '{}': {}", batch_file.display(), e))?;

    let prompts = parse_batch_prompts(&contents);
    if prompts.is_empty() {
        return Err(format!(
            "No prompts found in batch file '{}'. Expected one prompt per line.",
            batch_file.display()
        ));
    }

    let manager = veo::manager_from_config(config).map_err(|e| e.to_string())?;
    let mut session = GenerationSession::new(manager);
    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));

    println!(
        "Batch generation: {} prompts from '{}'",
        prompts.len(),
        batch_file.display()
    );
    println!();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    let summary = rt.block_on(run_batch(
        &mut session,
        &prompts,
        config,
        image.as_ref(),
        &output_dir,
        cancel,
    ));

    println!();
    println!("Batch complete:");
    println!("  Generated: {}", summary.completed);
    if summary.failed > 0 {
        println!("  Failed: {}", summary.failed);
    }

    if summary.cancelled {
        Err(GenerationError::Cancelled.to_string())
    } else if summary.failed > 0 && summary.completed == 0 {
        Err("All prompts failed to generate".to_string())
    } else {
        Ok(())
    }
}

/// Generate one video, printing progress, and optionally copy it to `output`.
pub async fn generate_single<P: VideoProvider>(
    session: &mut GenerationSession<P>,
    request: GenerationRequest,
    output: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<PathBuf, String> {
    println!("Generating video for: \"{}\"", request.prompt());
    println!();

    let artifact = session
        .submit(request, cancel, |event| println!("  {}", event))
        .await
        .map_err(|e| e.to_string())?;

    println!();
    println!("Video ready!");
    println!("  Path: {}", artifact.path().display());
    println!("  Id: {}", artifact.id());
    println!("  Size: {}", super::commands::format_size(artifact.size_bytes()));

    match output {
        Some(dest) => {
            let saved = artifact
                .save_as(dest)
                .map_err(|e| format!("Failed to save video to '{}': {}", dest.display(), e))?;
            println!("  Saved: {}", saved.display());
            Ok(saved)
        }
        None => Ok(artifact.path().to_path_buf()),
    }
}

/// Generate every prompt in order, copying each video into `output_dir`.
///
/// Starting the next prompt releases the previous download, so only the
/// copies in `output_dir` remain afterwards.
pub async fn run_batch<P: VideoProvider>(
    session: &mut GenerationSession<P>,
    prompts: &[&str],
    config: &Config,
    image: Option<&ReferenceImage>,
    output_dir: &Path,
    cancel: &CancellationToken,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let total = prompts.len();

    for (i, prompt) in prompts.iter().enumerate() {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        let progress = format!("[{}/{}]", i + 1, total);
        println!("{} Generating: \"{}\"", progress, prompt);

        let request = match build_request(prompt, config, image.cloned()) {
            Ok(request) => request,
            Err(e) => {
                eprintln!("    Failed: {}", e);
                summary.failed += 1;
                continue;
            }
        };

        match session
            .submit(request, cancel, |event| println!("    {}", event))
            .await
        {
            Ok(artifact) => {
                let dest = output_dir.join(batch_file_name(i, artifact.id()));
                match artifact.save_as(&dest) {
                    Ok(saved) => {
                        println!("    Saved: {}", saved.display());
                        summary.completed += 1;
                    }
                    Err(e) => {
                        eprintln!("    Failed to save video: {}", e);
                        summary.failed += 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("    Failed: {}", e);
                summary.failed += 1;
                if e.kind() == ErrorKind::Cancelled {
                    summary.cancelled = true;
                    break;
                }
            }
        }
    }

    if let Err(e) = session.release() {
        log::warn!("Failed to release last video: {}", e);
    }

    summary
}

fn batch_file_name(index: usize, id: &str) -> String {
    format!("{:03}-{}.mp4", index + 1, id)
}
