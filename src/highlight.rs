//! Highlight span computation.
//!
//! Matching runs over the normalized form of the displayed text, both
//! literally and over a "collapsed" copy with whitespace and parentheses
//! removed. Collapsed hits are projected back through an offset map so a
//! keyword like `가족여행` still marks `가족` and `여행` in `가족(여행)`
//! without swallowing the characters in between. All offsets returned are
//! character offsets into the original text.

use serde::Serialize;

use crate::normalize::{Projection, is_collapsible, normalize, strip};

/// Half-open `[start, end)` character range of the original text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Compute the merged highlight spans of `keywords` within `text`.
///
/// The result is sorted, pairwise disjoint, and every span lies within
/// `0..text.chars().count()`.
///
/// # Examples
///
/// ```
/// use notelens::highlight::{HighlightSpan, highlight};
///
/// let spans = highlight("가족(여행) 계획", &["가족", "여행"]);
/// assert_eq!(spans, vec![HighlightSpan::new(0, 2), HighlightSpan::new(3, 5)]);
/// ```
pub fn highlight<S: AsRef<str>>(
    text: &str,
    keywords: &[S],
) -> Vec<HighlightSpan> {
    if keywords.is_empty() {
        return Vec::new();
    }
    let comparable = Projection::of(text);
    if comparable.is_empty() {
        return Vec::new();
    }
    let collapsed = CollapsedView::of(comparable.chars());

    let mut spans = Vec::new();
    for keyword in keywords {
        let keyword = normalize(keyword.as_ref());
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }

        let literal: Vec<char> = keyword.chars().collect();
        for start in find_all(comparable.chars(), &literal) {
            let range =
                comparable.original_range(start, start + literal.len() - 1);
            push_span(&mut spans, range.start, range.end);
        }

        let reduced: Vec<char> = strip(keyword).chars().collect();
        if reduced.is_empty() {
            continue;
        }
        for start in find_all(&collapsed.chars, &reduced) {
            let first = collapsed.to_comparable[start];
            let last = collapsed.to_comparable[start + reduced.len() - 1];
            let range = comparable.original_range(first, last);
            push_span(&mut spans, range.start, range.end);
        }
    }

    merge_spans(spans)
}

/// Number of merged spans `keywords` produce in `text`.
pub fn count_highlights<S: AsRef<str>>(text: &str, keywords: &[S]) -> usize {
    highlight(text, keywords).len()
}

fn push_span(spans: &mut Vec<HighlightSpan>, start: usize, end: usize) {
    if start < end {
        spans.push(HighlightSpan::new(start, end));
    }
}

/// Sort spans and fuse any that overlap or touch.
pub fn merge_spans(mut spans: Vec<HighlightSpan>) -> Vec<HighlightSpan> {
    spans.retain(|span| !span.is_empty());
    spans.sort_unstable();

    let mut merged: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => {
                last.end = last.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// The comparable text with whitespace and parentheses dropped, plus the
/// index each remaining character had before dropping.
struct CollapsedView {
    chars: Vec<char>,
    to_comparable: Vec<usize>,
}

impl CollapsedView {
    fn of(comparable: &[char]) -> Self {
        let mut chars = Vec::with_capacity(comparable.len());
        let mut to_comparable = Vec::with_capacity(comparable.len());
        for (index, &c) in comparable.iter().enumerate() {
            if is_collapsible(c) {
                continue;
            }
            chars.push(c);
            to_comparable.push(index);
        }
        Self {
            chars,
            to_comparable,
        }
    }
}

/// Start offsets of every occurrence of `needle`, including occurrences
/// that overlap an earlier one. Overlapping hits always merge into the
/// span of the hit they overlap, so they only widen a span to cover
/// repeats like `aa` in `aaa`; they never add one.
fn find_all<'a>(
    haystack: &'a [char],
    needle: &'a [char],
) -> impl Iterator<Item = usize> + 'a {
    let candidates = if needle.is_empty() {
        0
    } else {
        (haystack.len() + 1).saturating_sub(needle.len())
    };
    (0..candidates).filter(move |&at| haystack[at..].starts_with(needle))
}
