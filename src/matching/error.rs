use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the matching engine.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Directory does not exist or is not a directory: '{}'", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory entry under '{}'", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to complete matching: {0}")]
    MatchingFailed(String),
}

impl MatchError {
    pub(crate) fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::InvalidPath { path, .. } | Self::DirectoryNotFound(path) | Self::Walk { path, .. } => Some(path),
            Self::InvalidArgument(_) | Self::MatchingFailed(_) => None,
        }
    }
}
