use std::path::Path;

use crate::matching::MatchError;

/// Receives matching decisions as they are made.
///
/// All methods default to doing nothing, so implementors only override what they report.
pub trait MatchObserver {
    fn exact_match(&mut self, _video: &Path, _subtitle: &Path) {}

    fn close_match(&mut self, _video: &Path, _subtitle: &Path, _similarity: f64) {}

    fn unmatched_video(&mut self, _video: &Path, _best_similarity: Option<f64>) {}

    /// A file could not be processed and was left unmatched.
    fn skipped(&mut self, _path: &Path, _error: &MatchError) {}
}

impl MatchObserver for () {}
