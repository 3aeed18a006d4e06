mod config;
mod convert;
mod display;
mod file_ops;
mod logger;
mod runner;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::runner::Subber;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Match video files with subtitle files by name")]
pub(crate) struct SubberArgs {
    /// Optional input directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Minimum similarity for a close match (0-1)
    #[arg(short, long, name = "MIN")]
    similarity: Option<f64>,

    /// Similarity boost for filenames with the same date (0-1)
    #[arg(short, long, name = "BOOST")]
    boost: Option<f64>,

    /// Print plain lines instead of tables
    #[arg(short, long)]
    no_table: bool,

    /// Show absolute paths
    #[arg(short, long)]
    absolute: bool,

    /// Also write the results to a file
    #[arg(short, long, name = "FILE", value_hint = clap::ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Rename close matched subtitles to the video name
    #[arg(short, long)]
    rename: bool,

    /// Move unmatched videos to a folder under the input directory
    #[arg(short, long, name = "FOLDER")]
    move_unmatched: Option<String>,

    /// Extract audio from unmatched videos to mp3
    #[arg(short, long)]
    convert: bool,

    /// Answer yes to all prompts
    #[arg(short, long)]
    yes: bool,

    /// Only print changes without modifying files
    #[arg(short, long)]
    print: bool,

    /// Overwrite existing files
    #[arg(short, long)]
    force: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = SubberArgs::parse();
    if let Some(ref shell) = args.completion {
        subber::generate_shell_completion(*shell, SubberArgs::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        Subber::new(args)?.run()
    }
}
