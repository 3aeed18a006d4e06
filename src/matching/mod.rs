//! Matching video files with subtitle files by filename.

mod collect;
mod error;
mod matcher;
mod normalize;
mod observer;
mod types;

pub use collect::collect;
pub use error::MatchError;
pub use matcher::{find_matches, score};
pub use normalize::{jaccard_similarity, normalize, words};
pub use observer::MatchObserver;
pub use types::{
    CloseMatch, DEFAULT_DATE_BOOST, DEFAULT_MIN_SIMILARITY, ExactMatch, FileCandidate, MatchOptions, MatchResult,
    MediaKind, SUBTITLE_EXTENSIONS, VIDEO_EXTENSIONS, WordSet,
};
