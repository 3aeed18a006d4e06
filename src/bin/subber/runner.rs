use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use subber::matching::{self, MatchError, MatchObserver, MatchResult};
use subber::{get_relative_path_or_filename, print_bold, print_error, print_warning};

use crate::SubberArgs;
use crate::config::{Config, SubberConfig};
use crate::convert;
use crate::display::Report;
use crate::file_ops::{self, OperationResult};
use crate::logger::FileLogger;

#[derive(Debug)]
pub struct Subber {
    root: PathBuf,
    config: Config,
}

/// Forwards match decisions to the log file and, in verbose mode, to the console.
struct RunObserver<'a> {
    logger: Option<&'a mut FileLogger>,
    root: &'a Path,
    verbose: bool,
}

impl MatchObserver for RunObserver<'_> {
    fn exact_match(&mut self, video: &Path, subtitle: &Path) {
        if let Some(logger) = self.logger.as_deref_mut() {
            logger.exact_match(video, subtitle);
        }
        if self.verbose {
            println!(
                "{} {} -> {}",
                "Exact:".green(),
                get_relative_path_or_filename(video, self.root),
                get_relative_path_or_filename(subtitle, self.root)
            );
        }
    }

    fn close_match(&mut self, video: &Path, subtitle: &Path, similarity: f64) {
        if let Some(logger) = self.logger.as_deref_mut() {
            logger.close_match(video, subtitle, similarity);
        }
        if self.verbose {
            println!(
                "{} {} -> {} ({similarity:.2})",
                "Close:".yellow(),
                get_relative_path_or_filename(video, self.root),
                get_relative_path_or_filename(subtitle, self.root)
            );
        }
    }

    fn unmatched_video(&mut self, video: &Path, best_similarity: Option<f64>) {
        if let Some(logger) = self.logger.as_deref_mut() {
            logger.unmatched_video(video, best_similarity);
        }
        if self.verbose {
            let best = best_similarity.map_or_else(String::new, |s| format!(" (best {s:.2})"));
            println!(
                "{} {}{best}",
                "No match:".red(),
                get_relative_path_or_filename(video, self.root)
            );
        }
    }

    fn skipped(&mut self, path: &Path, error: &MatchError) {
        if let Some(logger) = self.logger.as_deref_mut() {
            logger.skipped(path, error);
        }
        print_warning!("Skipping {}: {error}", path.display());
    }
}

impl Subber {
    pub fn new(args: SubberArgs) -> Result<Self> {
        let root = subber::resolve_input_path(args.path.as_deref())?;
        if !root.is_dir() {
            anyhow::bail!("Input path is not a directory: {}", root.display());
        }
        let user_config = SubberConfig::get_user_config()?;
        let config = Config::try_from_args(args, user_config)?;
        Ok(Self { root, config })
    }

    /// Collect, match and report, then run the requested file operations.
    pub fn run(&self) -> Result<()> {
        let mut logger = match FileLogger::new() {
            Ok(logger) => Some(logger),
            Err(error) => {
                print_warning!("Logging disabled: {error}");
                None
            }
        };
        if let Some(logger) = logger.as_mut() {
            logger.log_init(&self.root, &self.config);
        }

        let (videos, subtitles) = matching::collect(&self.root)?;
        if let Some(logger) = logger.as_mut() {
            logger.log_collected(videos.len(), subtitles.len());
        }
        if self.config.verbose {
            print_bold!(
                "Found {} video files and {} subtitle files in {}",
                videos.len(),
                subtitles.len(),
                self.root.display()
            );
        }
        if videos.is_empty() && subtitles.is_empty() {
            println!("No video or subtitle files found");
            return Ok(());
        }

        let result = {
            let mut observer = RunObserver {
                logger: logger.as_mut(),
                root: &self.root,
                verbose: self.config.verbose,
            };
            matching::find_matches(&videos, &subtitles, &self.config.options, &mut observer)?
        };

        let report = Report::new(&result, &self.root, self.config.absolute_paths);
        report.print(!self.config.no_table);
        if let Some(output) = &self.config.output {
            match report.write_to_file(output) {
                Ok(()) => println!("{}", format!("Results written to {}", output.display()).green()),
                Err(error) => print_error!("{error:#}"),
            }
        }

        self.run_operations(&result, logger.as_mut());

        if let Some(logger) = logger.as_mut() {
            logger.log_summary(&result);
            if self.config.verbose {
                println!("Log file: {}", logger.path().display());
            }
        }
        Ok(())
    }

    /// Rename, convert and move in that order.
    ///
    /// A step that fails is reported and the following steps still run.
    fn run_operations(&self, result: &MatchResult, mut logger: Option<&mut FileLogger>) {
        if self.config.rename
            && let Err(error) = self.rename_close_matches(result, logger.as_deref_mut())
        {
            Self::report_failure("rename", &error, logger.as_deref_mut());
        }
        if self.config.convert
            && let Err(error) = self.convert_unmatched(result, logger.as_deref_mut())
        {
            Self::report_failure("convert", &error, logger.as_deref_mut());
        }
        if let Some(folder) = &self.config.move_unmatched
            && let Err(error) = self.move_unmatched(result, folder, logger.as_deref_mut())
        {
            Self::report_failure("move", &error, logger.as_deref_mut());
        }
    }

    fn rename_close_matches(&self, result: &MatchResult, logger: Option<&mut FileLogger>) -> Result<()> {
        if result.close.is_empty() {
            if self.config.verbose {
                println!("No close matches to rename");
            }
            return Ok(());
        }

        print_bold!("Rename subtitles");
        let selected = file_ops::select_pairs(&result.close_pairs(), self.config.auto || self.config.dryrun)?;
        if selected.is_empty() {
            println!("No pairs selected for renaming");
            return Ok(());
        }

        let results = file_ops::rename_subtitles(&selected, self.config.dryrun, self.config.overwrite);
        Self::report_operations("rename", &results, logger);
        Ok(())
    }

    fn convert_unmatched(&self, result: &MatchResult, logger: Option<&mut FileLogger>) -> Result<()> {
        let output_dir = self.root.join(convert::AUDIO_OUTPUT_DIR);
        let videos = convert::pending_conversions(&result.unmatched_video_paths(), &output_dir);
        if videos.is_empty() {
            if self.config.verbose {
                println!("No unmatched videos to convert");
            }
            return Ok(());
        }
        if !self.config.dryrun && !convert::ffmpeg_available() {
            anyhow::bail!("ffmpeg not found. Install ffmpeg and make sure it is in PATH");
        }

        print_bold!("Extract audio to {}", output_dir.display());
        let selected = file_ops::select_files(&videos, "Convert", self.config.auto || self.config.dryrun)?;
        if selected.is_empty() {
            return Ok(());
        }

        let abort_flag = convert::install_abort_handler()?;
        let results = convert::convert_all(&selected, &output_dir, self.config.dryrun, &abort_flag)?;
        Self::report_operations("convert", &results, logger);
        Ok(())
    }

    fn move_unmatched(&self, result: &MatchResult, folder: &str, logger: Option<&mut FileLogger>) -> Result<()> {
        let videos = result.unmatched_video_paths();
        if videos.is_empty() {
            if self.config.verbose {
                println!("No unmatched videos to move");
            }
            return Ok(());
        }

        print_bold!("Move unmatched videos to {folder}");
        let selected = file_ops::select_files(&videos, "Move", self.config.auto || self.config.dryrun)?;
        if selected.is_empty() {
            return Ok(());
        }

        let results = file_ops::move_files(
            &selected,
            folder,
            &self.root,
            self.config.dryrun,
            self.config.overwrite,
        )?;
        Self::report_operations("move", &results, logger);
        Ok(())
    }

    fn report_failure(operation: &str, error: &anyhow::Error, logger: Option<&mut FileLogger>) {
        print_error!("{operation} failed: {error:#}");
        if let Some(logger) = logger {
            logger.log_error(operation, error);
        }
    }

    fn report_operations(operation: &str, results: &[OperationResult], mut logger: Option<&mut FileLogger>) {
        for result in results {
            result.print();
            if let Some(logger) = logger.as_deref_mut() {
                logger.log_operation(operation, result);
            }
        }
        let done = results.iter().filter(|r| r.is_done()).count();
        if done > 0 {
            println!("{}", format!("{done}/{} {operation} operations done", results.len()).green());
        }
    }
}
