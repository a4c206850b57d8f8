//! Occurrence-count relevance scoring.

use crate::{
    corpus::{AttachmentEntry, Record},
    views::ViewSet,
};

/// Number of non-overlapping, left-to-right occurrences of `needle`.
///
/// An empty needle never matches.
///
/// ```
/// use notelens::scoring::count_occurrences;
///
/// assert_eq!(count_occurrences("aaaa", "aa"), 2);
/// assert_eq!(count_occurrences("abc", ""), 0);
/// ```
pub fn count_occurrences(haystack: &str, needle: &str) -> u64 {
    if needle.is_empty() || haystack.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as u64
}

/// Total occurrences of every keyword across every view of every field.
pub fn score_views<'a>(
    fields: impl IntoIterator<Item = &'a ViewSet>,
    keywords: &[String],
) -> u64 {
    if keywords.is_empty() {
        return 0;
    }
    fields
        .into_iter()
        .flat_map(ViewSet::iter)
        .map(|view| {
            keywords
                .iter()
                .map(|keyword| count_occurrences(view, keyword))
                .sum::<u64>()
        })
        .sum()
}

/// Score a note over its title and all attachment names.
pub fn score_record(record: &Record, keywords: &[String]) -> u64 {
    score_views(record.views(), keywords)
}

/// Score one attachment over its own name and its note's title.
pub fn score_attachment(entry: &AttachmentEntry<'_>, keywords: &[String]) -> u64 {
    score_views(entry.views(), keywords)
}
