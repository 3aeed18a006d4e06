use std::path::Path;

use walkdir::WalkDir;

use crate::matching::{FileCandidate, MatchError, MediaKind};

/// Filename prefix of macOS resource fork files.
const RESOURCE_FORK_PREFIX: &str = "._";

/// Recursively collect video and subtitle files under the given directory.
///
/// Files are returned in lexical path order.
/// Resource fork files and unknown extensions are ignored.
///
/// # Errors
/// Returns `DirectoryNotFound` if the path is not an existing directory,
/// or `Walk` if a directory entry cannot be read.
pub fn collect(directory: impl AsRef<Path>) -> Result<(Vec<FileCandidate>, Vec<FileCandidate>), MatchError> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(MatchError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut videos = Vec::new();
    let mut subtitles = Vec::new();

    for entry in WalkDir::new(directory).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| MatchError::Walk {
            path: source.path().unwrap_or(directory).to_path_buf(),
            source,
        })?;

        // Symlinked files count as files, dangling links do not.
        if !entry.path().is_file() || is_resource_fork(&entry) {
            continue;
        }

        match FileCandidate::from_path(entry.into_path()) {
            Some(candidate) if candidate.kind() == MediaKind::Video => videos.push(candidate),
            Some(candidate) => subtitles.push(candidate),
            None => {}
        }
    }

    videos.sort_unstable();
    subtitles.sort_unstable();
    Ok((videos, subtitles))
}

fn is_resource_fork(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .as_encoded_bytes()
        .starts_with(RESOURCE_FORK_PREFIX.as_bytes())
}
