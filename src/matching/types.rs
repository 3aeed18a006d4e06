use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::matching::MatchError;

/// Video file extensions, lowercase without the leading dot.
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mkv", "mov", "mp4"];

/// Subtitle file extensions, lowercase without the leading dot.
pub const SUBTITLE_EXTENSIONS: [&str; 1] = ["srt"];

/// Default minimum similarity for a close match.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.3;

/// Default similarity boost for filenames carrying the same date.
pub const DEFAULT_DATE_BOOST: f64 = 0.3;

/// Lowercase words of a filename stem.
pub type WordSet = HashSet<String>;

/// Media file classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    Video,
    Subtitle,
}

impl MediaKind {
    /// Classify a path by its extension, ignoring case.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = crate::path_to_file_extension_string(path);
        if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Video)
        } else if SUBTITLE_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Subtitle)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Subtitle => write!(f, "subtitle"),
        }
    }
}

/// A video or subtitle file found in the library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileCandidate {
    path: PathBuf,
    kind: MediaKind,
}

impl FileCandidate {
    #[must_use]
    pub const fn new(path: PathBuf, kind: MediaKind) -> Self {
        Self { path, kind }
    }

    #[must_use]
    pub fn video(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), MediaKind::Video)
    }

    #[must_use]
    pub fn subtitle(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), MediaKind::Subtitle)
    }

    /// Create a candidate if the path has a known video or subtitle extension.
    #[must_use]
    pub fn from_path(path: PathBuf) -> Option<Self> {
        MediaKind::from_path(&path).map(|kind| Self::new(path, kind))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// File name including extension.
    #[must_use]
    pub fn file_name(&self) -> String {
        crate::path_to_filename_string(&self.path)
    }

    /// File stem with composed unicode characters.
    ///
    /// # Errors
    /// Returns `InvalidPath` if the path has no file name.
    pub fn stem(&self) -> Result<String, MatchError> {
        crate::normalized_file_stem(&self.path)
            .ok_or_else(|| MatchError::invalid_path(&self.path, "cannot determine file name"))
    }

    /// Lowercase file stem used for exact matching.
    ///
    /// # Errors
    /// Returns `InvalidPath` if the path has no file name.
    pub fn lowercase_stem(&self) -> Result<String, MatchError> {
        self.stem().map(|stem| stem.to_lowercase())
    }
}

impl AsRef<Path> for FileCandidate {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for FileCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Video and subtitle with identical stems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatch {
    pub video: FileCandidate,
    pub subtitle: FileCandidate,
}

/// Video and subtitle paired by word similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseMatch {
    pub video: FileCandidate,
    pub subtitle: FileCandidate,
    /// Similarity in range 0..=1, including the date boost.
    pub similarity: f64,
}

/// Outcome of matching.
///
/// Every input video is in exactly one of `exact`, `close` or `unmatched_videos`,
/// and every input subtitle in exactly one of `exact`, `close` or `unmatched_subtitles`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub exact: Vec<ExactMatch>,
    pub close: Vec<CloseMatch>,
    pub unmatched_videos: Vec<FileCandidate>,
    pub unmatched_subtitles: Vec<FileCandidate>,
}

impl MatchResult {
    /// Number of videos across all buckets.
    #[must_use]
    pub fn video_count(&self) -> usize {
        self.exact.len() + self.close.len() + self.unmatched_videos.len()
    }

    /// Number of subtitles across all buckets.
    #[must_use]
    pub fn subtitle_count(&self) -> usize {
        self.exact.len() + self.close.len() + self.unmatched_subtitles.len()
    }

    /// Close matches as (video, subtitle) path pairs.
    #[must_use]
    pub fn close_pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.close
            .iter()
            .map(|m| (m.video.path().to_path_buf(), m.subtitle.path().to_path_buf()))
            .collect()
    }

    /// Paths of unmatched videos.
    #[must_use]
    pub fn unmatched_video_paths(&self) -> Vec<PathBuf> {
        self.unmatched_videos.iter().map(|v| v.path().to_path_buf()).collect()
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} exact, {} close, {} unmatched videos, {} unmatched subtitles",
            self.exact.len(),
            self.close.len(),
            self.unmatched_videos.len(),
            self.unmatched_subtitles.len()
        )
    }
}

/// Tunable matching values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Minimum similarity for a close match, in range 0..=1.
    pub min_similarity: f64,
    /// Added to the similarity when both filenames contain the same date.
    pub date_boost: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            date_boost: DEFAULT_DATE_BOOST,
        }
    }
}

impl MatchOptions {
    #[must_use]
    pub const fn new(min_similarity: f64, date_boost: f64) -> Self {
        Self {
            min_similarity,
            date_boost,
        }
    }

    /// Check that both values are within 0..=1.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an out of range or NaN value.
    pub fn validate(&self) -> Result<(), MatchError> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(MatchError::InvalidArgument(format!(
                "min_similarity must be between 0 and 1, got {}",
                self.min_similarity
            )));
        }
        if !(0.0..=1.0).contains(&self.date_boost) {
            return Err(MatchError::InvalidArgument(format!(
                "date_boost must be between 0 and 1, got {}",
                self.date_boost
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension_case_insensitively() {
        assert_eq!(MediaKind::from_path(Path::new("a.MKV")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("a.mov")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("dir/a.Mp4")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("a.SRT")), Some(MediaKind::Subtitle));
        assert_eq!(MediaKind::from_path(Path::new("a.ass")), None);
        assert_eq!(MediaKind::from_path(Path::new("a.avi")), None);
        assert_eq!(MediaKind::from_path(Path::new("mp4")), None);
    }

    #[test]
    fn candidate_stem() {
        let candidate = FileCandidate::video("library/Show.S01E01.mp4");
        assert_eq!(candidate.stem().expect("stem"), "Show.S01E01");
        assert_eq!(candidate.lowercase_stem().expect("stem"), "show.s01e01");
        assert_eq!(candidate.file_name(), "Show.S01E01.mp4");
    }

    #[test]
    fn candidate_without_file_name_is_invalid() {
        let candidate = FileCandidate::video("");
        assert!(matches!(candidate.stem(), Err(MatchError::InvalidPath { .. })));

        let candidate = FileCandidate::subtitle("..");
        assert!(matches!(candidate.stem(), Err(MatchError::InvalidPath { .. })));
    }

    #[test]
    fn from_path_skips_unknown_extensions() {
        assert!(FileCandidate::from_path(PathBuf::from("notes.txt")).is_none());
        let candidate = FileCandidate::from_path(PathBuf::from("movie.srt")).expect("subtitle");
        assert_eq!(candidate.kind(), MediaKind::Subtitle);
    }

    #[test]
    fn default_options() {
        let options = MatchOptions::default();
        crate::assert_f64_eq(options.min_similarity, 0.3);
        crate::assert_f64_eq(options.date_boost, 0.3);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn options_out_of_range() {
        assert!(MatchOptions::new(1.5, 0.3).validate().is_err());
        assert!(MatchOptions::new(-0.1, 0.3).validate().is_err());
        assert!(MatchOptions::new(f64::NAN, 0.3).validate().is_err());
        assert!(MatchOptions::new(0.3, 2.0).validate().is_err());
        assert!(MatchOptions::new(0.0, 0.0).validate().is_ok());
        assert!(MatchOptions::new(1.0, 1.0).validate().is_ok());
    }
}
