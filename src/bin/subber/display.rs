use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::{Color, Colorize};
use itertools::Itertools;

use subber::matching::{FileCandidate, MatchResult};
use subber::{get_relative_path_or_filename, path_to_string};

const NO_EXACT_MATCHES: &str = "No exact matches found.";
const NO_CLOSE_MATCHES: &str = "No close matches found.";
const NO_UNMATCHED_VIDEOS: &str = "All video files have matching subtitles.";
const NO_UNMATCHED_SUBTITLES: &str = "All subtitle files have matching videos.";

/// One titled block of the report.
struct Section {
    title: &'static str,
    color: Color,
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
    empty_message: &'static str,
}

/// Formats a match result for the terminal and for an output file.
pub struct Report<'a> {
    result: &'a MatchResult,
    root: &'a Path,
    absolute_paths: bool,
}

impl<'a> Report<'a> {
    pub const fn new(result: &'a MatchResult, root: &'a Path, absolute_paths: bool) -> Self {
        Self {
            result,
            root,
            absolute_paths,
        }
    }

    /// Print all sections to stdout.
    pub fn print(&self, table: bool) {
        let sections = self.sections();
        for section in &sections {
            let text = if table {
                render_table(section, true)
            } else {
                render_plain(section, true)
            };
            print!("{text}");
            println!();
        }
    }

    /// Plain report without colors.
    pub fn to_plain_text(&self) -> String {
        self.sections()
            .iter()
            .map(|section| render_plain(section, false))
            .join("\n")
    }

    /// Write the plain report to a file.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_plain_text())
            .with_context(|| format!("Error writing to file {}", path.display()))
    }

    fn display_path(&self, file: &FileCandidate) -> String {
        if self.absolute_paths {
            path_to_string(file.path())
        } else {
            get_relative_path_or_filename(file.path(), self.root)
        }
    }

    fn sections(&self) -> Vec<Section> {
        vec![
            Section {
                title: "Exact Matches",
                color: Color::Green,
                headers: &["Video File", "Subtitle File"],
                rows: self
                    .result
                    .exact
                    .iter()
                    .map(|m| vec![self.display_path(&m.video), self.display_path(&m.subtitle)])
                    .collect(),
                empty_message: NO_EXACT_MATCHES,
            },
            Section {
                title: "Close Matches",
                color: Color::Yellow,
                headers: &["Video File", "Subtitle File", "Similarity"],
                rows: self
                    .result
                    .close
                    .iter()
                    .map(|m| {
                        vec![
                            self.display_path(&m.video),
                            self.display_path(&m.subtitle),
                            format!("{:.2}", m.similarity),
                        ]
                    })
                    .collect(),
                empty_message: NO_CLOSE_MATCHES,
            },
            Section {
                title: "Unmatched Video Files",
                color: Color::Red,
                headers: &["Video File"],
                rows: self
                    .result
                    .unmatched_videos
                    .iter()
                    .map(|v| vec![self.display_path(v)])
                    .collect(),
                empty_message: NO_UNMATCHED_VIDEOS,
            },
            Section {
                title: "Unmatched Subtitle Files",
                color: Color::Red,
                headers: &["Subtitle File"],
                rows: self
                    .result
                    .unmatched_subtitles
                    .iter()
                    .map(|s| vec![self.display_path(s)])
                    .collect(),
                empty_message: NO_UNMATCHED_SUBTITLES,
            },
        ]
    }
}

fn paint(text: &str, color: Color, colored: bool) -> String {
    if colored {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}

fn paint_bold(text: &str, color: Color, colored: bool) -> String {
    if colored {
        text.color(color).bold().to_string()
    } else {
        text.to_string()
    }
}

/// Section as lines of `video --> subtitle (Similarity: 0.50)`.
fn render_plain(section: &Section, colored: bool) -> String {
    let mut text = String::new();
    let title = format!("{}:", section.title);
    let _ = writeln!(text, "{}", paint_bold(&title, section.color, colored));
    if section.rows.is_empty() {
        let _ = writeln!(text, "{}", section.empty_message);
        return text;
    }
    for row in &section.rows {
        let line = match row.as_slice() {
            [video, subtitle, similarity] => format!("{video} --> {subtitle} (Similarity: {similarity})"),
            [video, subtitle] => format!("{video} --> {subtitle}"),
            cells => cells.join(" "),
        };
        let _ = writeln!(text, "{}", paint(&line, section.color, colored));
    }
    text
}

/// Section as a table with aligned columns.
fn render_table(section: &Section, colored: bool) -> String {
    let mut text = String::new();
    let title = format!("{} ({})", section.title, section.rows.len());
    let _ = writeln!(text, "{}", paint_bold(&title, section.color, colored));
    if section.rows.is_empty() {
        let _ = writeln!(text, "{}", section.empty_message);
        return text;
    }

    let widths: Vec<usize> = section
        .headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            section
                .rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let header = format_row(section.headers.iter().copied(), &widths);
    let _ = writeln!(text, "{}", paint_bold(&header, section.color, colored));
    let divider = widths.iter().map(|width| "-".repeat(*width)).join("-+-");
    let _ = writeln!(text, "{}", paint(&divider, section.color, colored));
    for row in &section.rows {
        let _ = writeln!(text, "{}", format_row(row.iter().map(String::as_str), &widths));
    }
    text
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(padding))
        })
        .join(" | ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use subber::matching::{CloseMatch, ExactMatch};

    fn sample_result(root: &Path) -> MatchResult {
        MatchResult {
            exact: vec![ExactMatch {
                video: FileCandidate::video(root.join("movie.mp4")),
                subtitle: FileCandidate::subtitle(root.join("subs/movie.srt")),
            }],
            close: vec![CloseMatch {
                video: FileCandidate::video(root.join("trip_2024-01-24.mkv")),
                subtitle: FileCandidate::subtitle(root.join("trip_24.01.24_eng.srt")),
                similarity: 0.5,
            }],
            unmatched_videos: vec![FileCandidate::video(root.join("lonely.mov"))],
            unmatched_subtitles: vec![],
        }
    }

    #[test]
    fn plain_text_has_all_sections() {
        let root = PathBuf::from("/library");
        let result = sample_result(&root);
        let text = Report::new(&result, &root, false).to_plain_text();

        let expected = "\
Exact Matches:
movie.mp4 --> subs/movie.srt

Close Matches:
trip_2024-01-24.mkv --> trip_24.01.24_eng.srt (Similarity: 0.50)

Unmatched Video Files:
lonely.mov

Unmatched Subtitle Files:
All subtitle files have matching videos.
";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_result_messages() {
        let root = PathBuf::from("/library");
        let result = MatchResult::default();
        let text = Report::new(&result, &root, false).to_plain_text();

        assert!(text.contains(NO_EXACT_MATCHES));
        assert!(text.contains(NO_CLOSE_MATCHES));
        assert!(text.contains(NO_UNMATCHED_VIDEOS));
        assert!(text.contains(NO_UNMATCHED_SUBTITLES));
    }

    #[test]
    fn absolute_paths() {
        let root = PathBuf::from("/library");
        let result = sample_result(&root);
        let text = Report::new(&result, &root, true).to_plain_text();
        assert!(text.contains("/library/movie.mp4 --> /library/subs/movie.srt"));
    }

    #[test]
    fn table_columns_are_aligned() {
        let root = PathBuf::from("/library");
        let result = sample_result(&root);
        let report = Report::new(&result, &root, false);
        let sections = report.sections();
        let text = render_table(&sections[1], false);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Close Matches (1)");
        assert_eq!(lines[1], "Video File          | Subtitle File         | Similarity");
        assert_eq!(lines[2], "--------------------+-----------------------+-----------");
        assert_eq!(lines[3], "trip_2024-01-24.mkv | trip_24.01.24_eng.srt | 0.50");
    }

    #[test]
    fn table_for_empty_section_prints_message() {
        let root = PathBuf::from("/library");
        let result = MatchResult::default();
        let report = Report::new(&result, &root, false);
        let sections = report.sections();
        let text = render_table(&sections[0], false);
        assert_eq!(text, "Exact Matches (0)\nNo exact matches found.\n");
    }

    #[test]
    fn writes_output_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let result = sample_result(&root);
        let output = root.join("report.txt");

        Report::new(&result, &root, false)
            .write_to_file(&output)
            .expect("should write file");

        let content = fs::read_to_string(&output).expect("read");
        assert!(content.starts_with("Exact Matches:\n"));
        assert!(!content.contains('\u{1b}'));
    }
}
