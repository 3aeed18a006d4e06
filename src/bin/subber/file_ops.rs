use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::ProgressBar;

use subber::{path_to_filename_string, show_diff};

/// Outcome of a single file operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    Done {
        source: PathBuf,
        target: PathBuf,
    },
    DryRun {
        source: PathBuf,
        target: PathBuf,
    },
    Skipped {
        source: PathBuf,
        target: PathBuf,
        reason: String,
    },
    Failed {
        source: PathBuf,
        target: PathBuf,
        error: String,
    },
}

/// Answer to an interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    All,
    Quit,
}

impl OperationResult {
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    /// Print a one-line colored status.
    pub fn print(&self) {
        match self {
            Self::Done { .. } => println!("{} {self}", "✓".green()),
            Self::DryRun { .. } => println!("{} {self}", "[DRYRUN]".cyan()),
            Self::Skipped { .. } => println!("{} {}", "Skipped:".yellow(), self),
            Self::Failed { .. } => println!("{} {}", "Failed:".red(), self),
        }
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done { source, target } | Self::DryRun { source, target } => {
                write!(f, "\"{}\" -> \"{}\"", source.display(), target.display())
            }
            Self::Skipped { source, target, reason } => {
                write!(f, "\"{}\" -> \"{}\" ({reason})", source.display(), target.display())
            }
            Self::Failed { source, target, error } => {
                write!(f, "\"{}\" -> \"{}\": {error}", source.display(), target.display())
            }
        }
    }
}

/// New path for a subtitle so that it has the same name as the video.
///
/// The subtitle stays in its own directory and keeps its extension.
pub fn renamed_subtitle_path(video: &Path, subtitle: &Path) -> Result<PathBuf> {
    let video_stem = subber::normalized_file_stem(video)
        .with_context(|| format!("Failed to get file stem: {}", video.display()))?;
    let extension = subber::os_str_to_string(subtitle.extension().unwrap_or_default());
    let file_name = if extension.is_empty() {
        video_stem
    } else {
        format!("{video_stem}.{extension}")
    };
    Ok(subtitle.with_file_name(file_name))
}

/// Rename each subtitle to match its video.
///
/// `pairs` contains (video, subtitle) paths. Existing files are not overwritten unless `overwrite` is set.
pub fn rename_subtitles(pairs: &[(PathBuf, PathBuf)], dryrun: bool, overwrite: bool) -> Vec<OperationResult> {
    let progress_bar = create_progress_bar(if dryrun { 0 } else { pairs.len() as u64 });
    let results = pairs
        .iter()
        .map(|(video, subtitle)| {
            let result = rename_subtitle(video, subtitle, dryrun, overwrite);
            progress_bar.inc(1);
            result
        })
        .collect();
    progress_bar.finish_and_clear();
    results
}

fn rename_subtitle(video: &Path, subtitle: &Path, dryrun: bool, overwrite: bool) -> OperationResult {
    let target = match renamed_subtitle_path(video, subtitle) {
        Ok(target) => target,
        Err(error) => {
            return OperationResult::Failed {
                source: subtitle.to_path_buf(),
                target: subtitle.to_path_buf(),
                error: error.to_string(),
            };
        }
    };
    let source = subtitle.to_path_buf();

    if target == source {
        return OperationResult::Skipped {
            source,
            target,
            reason: "already named".to_string(),
        };
    }
    if target.exists() && !overwrite {
        return OperationResult::Skipped {
            source,
            target,
            reason: "file exists".to_string(),
        };
    }
    if dryrun {
        return OperationResult::DryRun { source, target };
    }

    match fs::rename(&source, &target) {
        Ok(()) => OperationResult::Done { source, target },
        Err(e) => OperationResult::Failed {
            source,
            target,
            error: e.to_string(),
        },
    }
}

/// Move files into `destination_folder` under `base_directory`.
///
/// The destination directory is created if needed.
/// Existing files are not overwritten unless `overwrite` is set.
///
/// # Errors
/// Returns an error if the folder name is empty or not a relative path,
/// or if the destination directory cannot be created.
pub fn move_files(
    paths: &[PathBuf],
    destination_folder: &str,
    base_directory: &Path,
    dryrun: bool,
    overwrite: bool,
) -> Result<Vec<OperationResult>> {
    let destination_folder = destination_folder.trim();
    if destination_folder.is_empty() {
        anyhow::bail!("Destination folder name is empty");
    }
    let folder = Path::new(destination_folder);
    if folder.is_absolute() || folder.components().any(|c| c == std::path::Component::ParentDir) {
        anyhow::bail!("Destination folder must be a relative path inside the input directory: {destination_folder}");
    }

    let destination = base_directory.join(folder);
    if !dryrun && !destination.is_dir() {
        fs::create_dir_all(&destination)
            .with_context(|| format!("Failed to create directory: {}", destination.display()))?;
    }

    let progress_bar = create_progress_bar(if dryrun { 0 } else { paths.len() as u64 });
    let results = paths
        .iter()
        .map(|path| {
            let result = move_file(path, &destination, dryrun, overwrite);
            progress_bar.inc(1);
            result
        })
        .collect();
    progress_bar.finish_and_clear();
    Ok(results)
}

fn move_file(path: &Path, destination: &Path, dryrun: bool, overwrite: bool) -> OperationResult {
    let source = path.to_path_buf();
    let target = destination.join(path_to_filename_string(path));

    if source == target {
        return OperationResult::Skipped {
            source,
            target,
            reason: "already in destination".to_string(),
        };
    }
    if target.exists() && !overwrite {
        return OperationResult::Skipped {
            source,
            target,
            reason: "file exists".to_string(),
        };
    }
    if dryrun {
        return OperationResult::DryRun { source, target };
    }

    match rename_or_copy(&source, &target) {
        Ok(()) => OperationResult::Done { source, target },
        Err(e) => OperationResult::Failed {
            source,
            target,
            error: e.to_string(),
        },
    }
}

/// Rename a file, or copy and remove it when the target is on another file system.
fn rename_or_copy(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Err(error) if error.kind() == io::ErrorKind::CrossesDevices => copy_and_remove(source, target),
        result => result,
    }
}

fn copy_and_remove(source: &Path, target: &Path) -> io::Result<()> {
    fs::copy(source, target)?;
    fs::remove_file(source)
}

/// Ask which close match subtitles to rename.
///
/// Shows a diff of each subtitle name against the new name.
/// Returns all pairs without asking when `auto` is set.
pub fn select_pairs(pairs: &[(PathBuf, PathBuf)], auto: bool) -> Result<Vec<(PathBuf, PathBuf)>> {
    if auto {
        return Ok(pairs.to_vec());
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    select_pairs_from(&mut input, pairs)
}

fn select_pairs_from(input: &mut impl BufRead, pairs: &[(PathBuf, PathBuf)]) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut selected = Vec::new();
    let total = pairs.len();
    for (index, (video, subtitle)) in pairs.iter().enumerate() {
        let Ok(target) = renamed_subtitle_path(video, subtitle) else {
            continue;
        };
        println!("{}", format!("[{}/{total}] {}", index + 1, path_to_filename_string(video)).bold());
        show_diff(&path_to_filename_string(subtitle), &path_to_filename_string(&target));
        match prompt(input, "Rename? (y/n/a/q): ")? {
            Answer::Yes => selected.push((video.clone(), subtitle.clone())),
            Answer::All => {
                selected.extend(pairs[index..].iter().cloned());
                break;
            }
            Answer::No => {}
            Answer::Quit => break,
        }
    }
    Ok(selected)
}

/// Ask which files to operate on, one file at a time.
pub fn select_files(paths: &[PathBuf], action: &str, auto: bool) -> Result<Vec<PathBuf>> {
    if auto {
        return Ok(paths.to_vec());
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    select_files_from(&mut input, paths, action)
}

fn select_files_from(input: &mut impl BufRead, paths: &[PathBuf], action: &str) -> Result<Vec<PathBuf>> {
    let mut selected = Vec::new();
    for (index, path) in paths.iter().enumerate() {
        let message = format!("{action} {}? (y/n/a/q): ", path_to_filename_string(path));
        match prompt(input, &message)? {
            Answer::Yes => selected.push(path.clone()),
            Answer::All => {
                selected.extend(paths[index..].iter().cloned());
                break;
            }
            Answer::No => {}
            Answer::Quit => break,
        }
    }
    Ok(selected)
}

fn prompt(input: &mut impl BufRead, message: &str) -> Result<Answer> {
    print!("{}", message.magenta());
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read input")?;
    Ok(parse_answer(&line))
}

fn parse_answer(line: &str) -> Answer {
    let answer = line.trim();
    if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
        Answer::Yes
    } else if answer.eq_ignore_ascii_case("a") || answer.eq_ignore_ascii_case("all") {
        Answer::All
    } else if answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit") {
        Answer::Quit
    } else {
        Answer::No
    }
}

/// Create a progress bar that is hidden during tests.
fn create_progress_bar(len: u64) -> ProgressBar {
    #[cfg(test)]
    {
        let _ = len;
        ProgressBar::hidden()
    }
    #[cfg(not(test))]
    {
        const PROGRESS_BAR_CHARS: &str = "=>-";
        const PROGRESS_BAR_TEMPLATE: &str = "[{elapsed_precise}] {bar:80.magenta/blue} {pos}/{len} {percent}%";

        if len < 2 {
            return ProgressBar::hidden();
        }
        let progress_bar = ProgressBar::new(len);
        let style = indicatif::ProgressStyle::default_bar()
            .template(PROGRESS_BAR_TEMPLATE)
            .map_or_else(
                |_| indicatif::ProgressStyle::default_bar(),
                |style| style.progress_chars(PROGRESS_BAR_CHARS),
            );
        progress_bar.set_style(style);
        progress_bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;
    use std::io::Cursor;

    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).expect("Failed to create file");
        path
    }

    fn create_subdir(dir: &Path, name: &str) -> PathBuf {
        let subdir = dir.join(name);
        fs::create_dir(&subdir).expect("Failed to create subdir");
        subdir
    }

    #[test]
    fn renamed_path_uses_video_stem_and_subtitle_extension() {
        let target = renamed_subtitle_path(Path::new("/videos/Movie.2020.mkv"), Path::new("/subs/movie_eng.SRT"))
            .expect("should build path");
        assert_eq!(target, PathBuf::from("/subs/Movie.2020.SRT"));
    }

    #[test]
    fn rename_moves_subtitle_to_video_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let video = create_file(dir, "Show.S01E01.mkv");
        let subs = create_subdir(dir, "subs");
        let subtitle = create_file(&subs, "show_s01e01_eng.srt");

        let results = rename_subtitles(&[(video, subtitle.clone())], false, false);

        assert_eq!(results.len(), 1);
        assert!(results[0].is_done());
        assert!(!subtitle.exists());
        assert!(subs.join("Show.S01E01.srt").exists());
    }

    #[test]
    fn rename_does_not_overwrite_existing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let video = create_file(dir, "movie.mp4");
        let subtitle = create_file(dir, "movie_eng.srt");
        let existing = create_file(dir, "movie.srt");

        let results = rename_subtitles(&[(video, subtitle.clone())], false, false);

        assert!(matches!(results[0], OperationResult::Skipped { ref target, .. } if *target == existing));
        assert!(subtitle.exists());
    }

    #[test]
    fn rename_overwrites_when_forced() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let video = create_file(dir, "movie.mp4");
        let subtitle = create_file(dir, "movie_eng.srt");
        fs::write(&subtitle, "1\n00:00:01,000 --> 00:00:02,000\nHello\n").expect("write");
        create_file(dir, "movie.srt");

        let results = rename_subtitles(&[(video, subtitle.clone())], false, true);

        assert!(results[0].is_done());
        assert!(!subtitle.exists());
        let content = fs::read_to_string(dir.join("movie.srt")).expect("read");
        assert!(content.contains("Hello"));
    }

    #[test]
    fn rename_dryrun_does_not_touch_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let video = create_file(dir, "movie.mp4");
        let subtitle = create_file(dir, "movie_eng.srt");

        let results = rename_subtitles(&[(video, subtitle.clone())], true, false);

        assert!(matches!(results[0], OperationResult::DryRun { .. }));
        assert!(subtitle.exists());
        assert!(!dir.join("movie.srt").exists());
    }

    #[test]
    fn rename_skips_already_named() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let video = create_file(dir, "movie.mp4");
        let subtitle = create_file(dir, "movie.srt");

        let results = rename_subtitles(&[(video, subtitle)], false, false);

        assert!(matches!(results[0], OperationResult::Skipped { ref reason, .. } if reason == "already named"));
    }

    #[test]
    fn move_creates_destination_and_moves_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let season = create_subdir(dir, "Season 1");
        let first = create_file(dir, "a.mp4");
        let second = create_file(&season, "b.mkv");

        let results = move_files(&[first.clone(), second.clone()], "no_subs", dir, false, false).expect("move");

        assert!(results.iter().all(OperationResult::is_done));
        assert!(!first.exists());
        assert!(!second.exists());
        assert!(dir.join("no_subs").join("a.mp4").exists());
        assert!(dir.join("no_subs").join("b.mkv").exists());
    }

    #[test]
    fn move_skips_existing_target() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let destination = create_subdir(dir, "no_subs");
        create_file(&destination, "a.mp4");
        let source = create_file(dir, "a.mp4");

        let results = move_files(std::slice::from_ref(&source), "no_subs", dir, false, false).expect("move");

        assert!(matches!(results[0], OperationResult::Skipped { .. }));
        assert!(source.exists());
    }

    #[test]
    fn move_rejects_empty_folder_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        assert!(move_files(&[], "", temp_dir.path(), false, false).is_err());
        assert!(move_files(&[], "   ", temp_dir.path(), false, false).is_err());
    }

    #[test]
    fn move_rejects_folder_outside_base() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        assert!(move_files(&[], "../elsewhere", temp_dir.path(), false, false).is_err());
    }

    #[test]
    fn move_dryrun_does_not_create_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let source = create_file(dir, "a.mp4");

        let results = move_files(std::slice::from_ref(&source), "no_subs", dir, true, false).expect("move");

        assert!(matches!(results[0], OperationResult::DryRun { .. }));
        assert!(source.exists());
        assert!(!dir.join("no_subs").exists());
    }

    #[test]
    fn copy_fallback_moves_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        let destination = create_subdir(dir, "no_subs");
        let source = dir.join("clip.mp4");
        fs::write(&source, "video data").expect("write");
        let target = destination.join("clip.mp4");

        copy_and_remove(&source, &target).expect("copy and remove");

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&target).expect("read"), "video data");
    }

    #[test]
    fn parses_answers() {
        assert_eq!(parse_answer("y\n"), Answer::Yes);
        assert_eq!(parse_answer("YES"), Answer::Yes);
        assert_eq!(parse_answer("a"), Answer::All);
        assert_eq!(parse_answer("q"), Answer::Quit);
        assert_eq!(parse_answer("n"), Answer::No);
        assert_eq!(parse_answer(""), Answer::No);
        assert_eq!(parse_answer("maybe"), Answer::No);
    }

    #[test]
    fn select_pairs_follows_answers() {
        let pairs = vec![
            (PathBuf::from("a.mp4"), PathBuf::from("a_eng.srt")),
            (PathBuf::from("b.mp4"), PathBuf::from("b_eng.srt")),
            (PathBuf::from("c.mp4"), PathBuf::from("c_eng.srt")),
        ];
        let mut input = Cursor::new("n\ny\nq\n");
        let selected = select_pairs_from(&mut input, &pairs).expect("select");
        assert_eq!(selected, vec![pairs[1].clone()]);
    }

    #[test]
    fn select_pairs_all_takes_remaining() {
        let pairs = vec![
            (PathBuf::from("a.mp4"), PathBuf::from("a_eng.srt")),
            (PathBuf::from("b.mp4"), PathBuf::from("b_eng.srt")),
            (PathBuf::from("c.mp4"), PathBuf::from("c_eng.srt")),
        ];
        let mut input = Cursor::new("n\na\n");
        let selected = select_pairs_from(&mut input, &pairs).expect("select");
        assert_eq!(selected, pairs[1..].to_vec());
    }

    #[test]
    fn select_files_stops_at_end_of_input() {
        let paths = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];
        let mut input = Cursor::new("y\n");
        let selected = select_files_from(&mut input, &paths, "Move").expect("select");
        assert_eq!(selected, vec![PathBuf::from("a.mp4")]);
    }

    #[test]
    fn auto_selects_everything() {
        let paths = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];
        assert_eq!(select_files(&paths, "Move", true).expect("select"), paths);
    }
}
