use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::file_ops::OperationResult;

/// Directory under the input root for extracted audio files.
pub const AUDIO_OUTPUT_DIR: &str = "audio_files";

const FFMPEG_DEFAULT_ARGS: [&str; 6] = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"];

/// Output mp3 path for the given video.
pub fn audio_output_path(video: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = subber::normalized_file_stem(video)
        .with_context(|| format!("Failed to get file stem: {}", video.display()))?;
    Ok(output_dir.join(format!("{stem}.mp3")))
}

/// Videos that do not have an audio file in `output_dir` yet.
pub fn pending_conversions(videos: &[PathBuf], output_dir: &Path) -> Vec<PathBuf> {
    videos
        .iter()
        .filter(|video| !audio_output_path(video, output_dir).is_ok_and(|path| path.exists()))
        .cloned()
        .collect()
}

/// Build the ffmpeg command that extracts all audio streams to mp3.
pub fn build_command(video: &Path, output: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(FFMPEG_DEFAULT_ARGS)
        .arg(video)
        .args(["-q:a", "0", "-map", "a"])
        .arg(output);
    cmd
}

/// Check that ffmpeg can be run.
pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Extract the audio of a single video to mp3 in `output_dir`.
///
/// An existing output file is left as is.
pub fn convert_to_mp3(video: &Path, output_dir: &Path, dryrun: bool) -> OperationResult {
    let source = video.to_path_buf();
    let target = match audio_output_path(video, output_dir) {
        Ok(path) => path,
        Err(error) => {
            return OperationResult::Failed {
                target: source.clone(),
                source,
                error: error.to_string(),
            };
        }
    };

    if target.exists() {
        return OperationResult::Skipped {
            source,
            target,
            reason: "file exists".to_string(),
        };
    }

    let mut cmd = build_command(video, &target);
    if dryrun {
        println!("[DRYRUN] {cmd:?}");
        return OperationResult::DryRun { source, target };
    }

    match run_command_isolated(&mut cmd) {
        Ok(status) if status.success() => OperationResult::Done { source, target },
        Ok(status) => OperationResult::Failed {
            source,
            target,
            error: format!("ffmpeg failed with status: {}", status.code().unwrap_or(-1)),
        },
        Err(e) => OperationResult::Failed {
            source,
            target,
            error: format!("Failed to execute ffmpeg: {e}"),
        },
    }
}

/// Extract audio from all given videos into `output_dir`.
///
/// Stops before the next file once `abort_flag` is set.
///
/// # Errors
/// Returns an error if ffmpeg is not available or the output directory cannot be created.
pub fn convert_all(
    videos: &[PathBuf],
    output_dir: &Path,
    dryrun: bool,
    abort_flag: &AtomicBool,
) -> Result<Vec<OperationResult>> {
    if !dryrun {
        if !ffmpeg_available() {
            anyhow::bail!("ffmpeg not found. Install ffmpeg and make sure it is in PATH");
        }
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;
    }

    let start = Instant::now();
    let total = videos.len();
    let num_digits = total.to_string().chars().count();
    let mut results = Vec::with_capacity(total);
    for (index, video) in videos.iter().enumerate() {
        if abort_flag.load(Ordering::SeqCst) {
            println!("\n{}", "Aborted by user".bold().red());
            break;
        }
        println!(
            "{} {}",
            format!("[{:>num_digits$}/{total}]", index + 1).bold(),
            subber::path_to_filename_string(video)
        );
        results.push(convert_to_mp3(video, output_dir, dryrun));
    }
    if !dryrun {
        println!("Finished in {}", subber::format_duration(start.elapsed()));
    }
    Ok(results)
}

/// Set up Ctrl+C handler that lets the current file finish.
///
/// A second Ctrl+C exits immediately.
pub fn install_abort_handler() -> Result<Arc<AtomicBool>> {
    let abort_flag = Arc::new(AtomicBool::new(false));
    let abort_flag_handler = Arc::clone(&abort_flag);

    ctrlc::set_handler(move || {
        if abort_flag_handler.load(Ordering::SeqCst) {
            std::process::exit(130);
        }
        println!("\n{}", "Received Ctrl+C, finishing current file...".yellow().bold());
        abort_flag_handler.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    Ok(abort_flag)
}

/// Run ffmpeg in its own process group so Ctrl+C only reaches this program.
fn run_command_isolated(cmd: &mut Command) -> std::io::Result<ExitStatus> {
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()).status()
}
