//! Two-phase video to subtitle matching.
//!
//! Phase 1 pairs files whose stems are equal ignoring case.
//! Phase 2 pairs the rest greedily by word-set similarity,
//! boosted when both filenames contain the same date.

use chrono::NaiveDate;

use crate::date::extract_date;
use crate::matching::normalize::{jaccard_similarity, normalize};
use crate::matching::{
    CloseMatch, ExactMatch, FileCandidate, MatchError, MatchObserver, MatchOptions, MatchResult, WordSet,
};

/// Subtitle still available for fuzzy matching.
#[derive(Debug)]
struct PoolEntry {
    /// Index into the input subtitle list.
    index: usize,
    words: WordSet,
    date: Option<NaiveDate>,
}

/// Find exact and close matches between videos and subtitles.
///
/// Each subtitle is assigned to at most one video.
/// Videos are processed in input order and earlier videos win conflicts.
///
/// # Errors
/// Returns `InvalidArgument` if the options are out of range,
/// or `MatchingFailed` if the fuzzy pass reaches an inconsistent state.
pub fn find_matches(
    videos: &[FileCandidate],
    subtitles: &[FileCandidate],
    options: &MatchOptions,
    observer: &mut impl MatchObserver,
) -> Result<MatchResult, MatchError> {
    options.validate()?;

    let mut result = MatchResult::default();
    let mut claimed = vec![false; subtitles.len()];

    let subtitle_stems: Vec<Option<String>> = subtitles
        .iter()
        .map(|subtitle| match subtitle.lowercase_stem() {
            Ok(stem) => Some(stem),
            Err(error) => {
                observer.skipped(subtitle.path(), &error);
                None
            }
        })
        .collect();

    let leftover_videos = match_exact(videos, subtitles, &subtitle_stems, &mut claimed, &mut result, observer);

    let mut pool: Vec<PoolEntry> = subtitle_stems
        .iter()
        .enumerate()
        .filter(|(index, stem)| !claimed[*index] && stem.is_some())
        .filter_map(|(index, stem)| {
            let subtitle = &subtitles[index];
            match normalize(subtitle.path()) {
                Ok(words) => Some(PoolEntry {
                    index,
                    words,
                    date: stem.as_deref().and_then(extract_date),
                }),
                Err(error) => {
                    observer.skipped(subtitle.path(), &error);
                    None
                }
            }
        })
        .collect();

    for video in leftover_videos {
        let (words, date) = match video_features(video) {
            Ok(features) => features,
            Err(error) => {
                observer.skipped(video.path(), &error);
                result.unmatched_videos.push(video.clone());
                continue;
            }
        };

        let best = best_candidate(&words, date, &pool, options.date_boost);

        match best {
            Some((position, similarity)) if similarity >= options.min_similarity => {
                let entry = claim(&mut pool, position, &mut claimed)?;
                let subtitle = &subtitles[entry.index];
                observer.close_match(video.path(), subtitle.path(), similarity);
                result.close.push(CloseMatch {
                    video: video.clone(),
                    subtitle: subtitle.clone(),
                    similarity,
                });
            }
            _ => {
                observer.unmatched_video(video.path(), best.map(|(_, similarity)| similarity));
                result.unmatched_videos.push(video.clone());
            }
        }
    }

    result.unmatched_subtitles = subtitles
        .iter()
        .zip(&claimed)
        .filter(|(_, claimed)| !**claimed)
        .map(|(subtitle, _)| subtitle.clone())
        .collect();

    Ok(result)
}

/// Pair videos with the first unclaimed subtitle that has the same stem.
/// Returns the videos left for fuzzy matching.
fn match_exact<'a>(
    videos: &'a [FileCandidate],
    subtitles: &[FileCandidate],
    subtitle_stems: &[Option<String>],
    claimed: &mut [bool],
    result: &mut MatchResult,
    observer: &mut impl MatchObserver,
) -> Vec<&'a FileCandidate> {
    let mut leftover = Vec::new();
    for video in videos {
        let video_stem = match video.lowercase_stem() {
            Ok(stem) => stem,
            Err(error) => {
                observer.skipped(video.path(), &error);
                result.unmatched_videos.push(video.clone());
                continue;
            }
        };

        let exact = subtitle_stems
            .iter()
            .enumerate()
            .position(|(index, stem)| !claimed[index] && stem.as_deref() == Some(video_stem.as_str()));

        if let Some(index) = exact {
            claimed[index] = true;
            let subtitle = &subtitles[index];
            observer.exact_match(video.path(), subtitle.path());
            result.exact.push(ExactMatch {
                video: video.clone(),
                subtitle: subtitle.clone(),
            });
        } else {
            leftover.push(video);
        }
    }
    leftover
}

fn video_features(video: &FileCandidate) -> Result<(WordSet, Option<NaiveDate>), MatchError> {
    let words = normalize(video.path())?;
    let date = extract_date(&video.stem()?);
    Ok((words, date))
}

/// Similarity of a video to one subtitle, including the date boost.
#[must_use]
pub fn score(
    video_words: &WordSet,
    video_date: Option<NaiveDate>,
    subtitle_words: &WordSet,
    subtitle_date: Option<NaiveDate>,
    date_boost: f64,
) -> f64 {
    let similarity = jaccard_similarity(video_words, subtitle_words);
    if let (Some(video_date), Some(subtitle_date)) = (video_date, subtitle_date)
        && video_date == subtitle_date
    {
        (similarity + date_boost).min(1.0)
    } else {
        similarity
    }
}

/// Position in the pool and similarity of the highest scoring subtitle.
/// Ties keep the earlier subtitle and a zero score never counts as a candidate.
fn best_candidate(
    words: &WordSet,
    date: Option<NaiveDate>,
    pool: &[PoolEntry],
    date_boost: f64,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (position, entry) in pool.iter().enumerate() {
        let similarity = score(words, date, &entry.words, entry.date, date_boost);
        if similarity > best.map_or(0.0, |(_, best_similarity)| best_similarity) {
            best = Some((position, similarity));
        }
    }
    best
}

/// Remove a subtitle from the pool and mark it as claimed.
fn claim(pool: &mut Vec<PoolEntry>, position: usize, claimed: &mut [bool]) -> Result<PoolEntry, MatchError> {
    if position >= pool.len() {
        return Err(MatchError::MatchingFailed(format!(
            "subtitle pool position {position} out of range ({} available)",
            pool.len()
        )));
    }
    let entry = pool.remove(position);
    match claimed.get_mut(entry.index) {
        Some(flag) if !*flag => {
            *flag = true;
            Ok(entry)
        }
        Some(_) => Err(MatchError::MatchingFailed(format!(
            "subtitle {} was already matched",
            entry.index
        ))),
        None => Err(MatchError::MatchingFailed(format!(
            "subtitle index {} out of range",
            entry.index
        ))),
    }
}
