use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use subber::matching::{MatchError, MatchObserver, MatchResult};

use crate::config::Config;
use crate::file_ops::OperationResult;

/// Simple file logger for a matching run with buffered writes
pub struct FileLogger {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileLogger {
    /// Create a new file logger, writing to ~/logs/subber/subber_<timestamp>.log
    pub(crate) fn new() -> Result<Self> {
        let log_dir = subber::config::log_dir().context("Failed to get home directory")?;
        Self::in_dir(&log_dir)
    }

    /// Create a new file logger in the given directory.
    pub(crate) fn in_dir(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let log_path = log_dir.join(format!("subber_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path: log_path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the program
    pub(crate) fn log_init(&mut self, root: &Path, config: &Config) {
        let _ = writeln!(self.writer, "[{}] INIT \"{}\"", Self::timestamp(), root.display());
        let _ = writeln!(self.writer, "  min_similarity: {}", config.options.min_similarity);
        let _ = writeln!(self.writer, "  date_boost: {}", config.options.date_boost);
        let _ = writeln!(self.writer, "  rename: {}", config.rename);
        if let Some(folder) = &config.move_unmatched {
            let _ = writeln!(self.writer, "  move_unmatched: {folder}");
        }
        let _ = writeln!(self.writer, "  convert: {}", config.convert);
        let _ = writeln!(self.writer, "  overwrite: {}", config.overwrite);
        let _ = writeln!(self.writer, "  dryrun: {}", config.dryrun);
        let _ = self.writer.flush();
    }

    /// Log the number of files found
    pub(crate) fn log_collected(&mut self, videos: usize, subtitles: usize) {
        let _ = writeln!(
            self.writer,
            "[{}] FOUND   {videos} video files and {subtitles} subtitle files",
            Self::timestamp()
        );
        let _ = self.writer.flush();
    }

    /// Log the outcome of a rename, move or convert operation
    pub(crate) fn log_operation(&mut self, operation: &str, result: &OperationResult) {
        let status = match result {
            OperationResult::Done { .. } => "DONE   ",
            OperationResult::DryRun { .. } => "DRYRUN ",
            OperationResult::Skipped { .. } => "SKIP   ",
            OperationResult::Failed { .. } => "ERROR  ",
        };
        let _ = writeln!(
            self.writer,
            "[{}] {status} {} {result}",
            Self::timestamp(),
            operation.to_uppercase(),
        );
        let _ = self.writer.flush();
    }

    /// Log an operation step that could not run
    pub(crate) fn log_error(&mut self, operation: &str, error: &anyhow::Error) {
        let _ = writeln!(
            self.writer,
            "[{}] ERROR   {} {error:#}",
            Self::timestamp(),
            operation.to_uppercase(),
        );
        let _ = self.writer.flush();
    }

    /// Log final match counts
    pub(crate) fn log_summary(&mut self, result: &MatchResult) {
        let _ = writeln!(self.writer, "[{}] SUMMARY {result}", Self::timestamp());
        let _ = writeln!(self.writer, "[{}] END", Self::timestamp());
        let _ = self.writer.flush();
    }
}

impl MatchObserver for FileLogger {
    fn exact_match(&mut self, video: &Path, subtitle: &Path) {
        let _ = writeln!(
            self.writer,
            "[{}] EXACT   \"{}\" -> \"{}\"",
            Self::timestamp(),
            video.display(),
            subtitle.display()
        );
    }

    fn close_match(&mut self, video: &Path, subtitle: &Path, similarity: f64) {
        let _ = writeln!(
            self.writer,
            "[{}] CLOSE   \"{}\" -> \"{}\" | Similarity: {similarity:.2}",
            Self::timestamp(),
            video.display(),
            subtitle.display()
        );
    }

    fn unmatched_video(&mut self, video: &Path, best_similarity: Option<f64>) {
        let best = best_similarity.map_or_else(String::new, |s| format!(" | Best similarity: {s:.2}"));
        let _ = writeln!(
            self.writer,
            "[{}] NOMATCH \"{}\"{best}",
            Self::timestamp(),
            video.display()
        );
    }

    fn skipped(&mut self, path: &Path, error: &MatchError) {
        let _ = writeln!(
            self.writer,
            "[{}] ERROR   \"{}\" | {error}",
            Self::timestamp(),
            path.display()
        );
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
