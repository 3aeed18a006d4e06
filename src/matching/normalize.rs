use std::path::Path;

use crate::matching::{MatchError, WordSet};

/// Split a filename stem into a set of lowercase alphanumeric words.
///
/// ```rust
/// use subber::matching::normalize;
///
/// let words = normalize("The.Big.Movie-2024.mp4").unwrap();
/// assert_eq!(words.len(), 4);
/// assert!(words.contains("movie"));
/// ```
///
/// # Errors
/// Returns `InvalidPath` if the path has no file name.
pub fn normalize(path: impl AsRef<Path>) -> Result<WordSet, MatchError> {
    let path = path.as_ref();
    let stem = crate::normalized_file_stem(path)
        .ok_or_else(|| MatchError::invalid_path(path, "cannot determine file name"))?;
    Ok(words(&stem))
}

/// Split text on runs of non-alphanumeric characters into lowercase words.
#[must_use]
pub fn words(text: &str) -> WordSet {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Jaccard index of two word sets: size of the intersection divided by size of the union.
///
/// Two empty sets have similarity 0.
#[must_use]
pub fn jaccard_similarity(a: &WordSet, b: &WordSet) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
