//! Text normalization shared by indexing, query compilation and
//! highlighting.
//!
//! Every comparison in the crate happens between strings produced by
//! [`normalize`]: NFKC composition followed by per-character Unicode
//! lowercasing. Lowercasing is applied per `char` (no final-sigma context)
//! so that normalizing a string piecewise yields the same characters as
//! normalizing it whole, which the highlighter relies on to map matches
//! back to the original text.

use std::ops::Range;

use unicode_normalization::{
    UnicodeNormalization,
    char::{canonical_combining_class, decompose_compatible},
    is_nfkc,
};

/// Upper bound on NFKC/lowercase rounds before giving up on a fixpoint.
const MAX_FOLD_PASSES: usize = 4;

/// Convert `text` into its canonical comparison form.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`. Code points
/// without a compatibility mapping pass through unchanged.
pub fn normalize(text: &str) -> String {
    if text.is_ascii() {
        return text.to_ascii_lowercase();
    }

    let mut current = fold_once(text);
    for _ in 0..MAX_FOLD_PASSES {
        if is_folded(&current) {
            break;
        }
        current = fold_once(&current);
    }
    current
}

fn fold_once(text: &str) -> String {
    text.nfkc().flat_map(char::to_lowercase).collect()
}

/// Lowercasing can surface characters that NFKC maps again (and vice
/// versa), so a single pass is not always a fixpoint.
fn is_folded(text: &str) -> bool {
    is_nfkc(text)
        && text.chars().all(|c| {
            let mut lower = c.to_lowercase();
            lower.next() == Some(c) && lower.next().is_none()
        })
}

/// Remove every run of Unicode whitespace.
pub fn collapse(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// [`collapse`] with literal `(` and `)` removed as well.
pub fn strip(s: &str) -> String {
    s.chars().filter(|&c| !is_collapsible(c)).collect()
}

/// Characters dropped when building the stripped form of a text.
pub(crate) fn is_collapsible(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')'
}

/// A normalized string that remembers where each of its characters came
/// from in the original text.
///
/// `origin[i]` is the half-open range of original character offsets that
/// produced normalized character `i`. Characters expanded by NFKC (a
/// ligature such as `ﬁ`) share one range; characters merged by
/// composition (a base letter followed by a combining mark) cover the
/// whole cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    chars: Vec<char>,
    origin: Vec<Range<usize>>,
}

impl Projection {
    /// Normalize `text` cluster by cluster, recording offsets.
    ///
    /// The concatenated clusters always equal [`normalize`] of the whole
    /// text. Neighbouring clusters that still interact under NFKC are
    /// merged; if that is not enough the whole text becomes one cluster.
    pub fn of(text: &str) -> Self {
        if text.is_ascii() {
            let chars: Vec<char> =
                text.chars().map(|c| c.to_ascii_lowercase()).collect();
            let origin = (0..chars.len()).map(|i| i..i + 1).collect();
            return Self { chars, origin };
        }

        let whole = normalize(text);
        let mut clusters = split_clusters(text);
        if !concatenates_to(&clusters, &whole) {
            clusters = merge_interacting(clusters);
        }
        if !concatenates_to(&clusters, &whole) {
            clusters = vec![Cluster {
                source: text.to_string(),
                range: 0..text.chars().count(),
                normalized: whole,
            }];
        }

        let mut chars = Vec::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len());
        for cluster in clusters {
            for c in cluster.normalized.chars() {
                chars.push(c);
                origin.push(cluster.range.clone());
            }
        }
        Self { chars, origin }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Original character range covered by normalized characters
    /// `first..=last`.
    pub fn original_range(&self, first: usize, last: usize) -> Range<usize> {
        self.origin[first].start..self.origin[last].end
    }
}

/// A run of original characters normalized as a unit.
struct Cluster {
    source: String,
    range: Range<usize>,
    normalized: String,
}

fn split_clusters(text: &str) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for (position, c) in text.chars().enumerate() {
        if let Some(last) = clusters.last_mut()
            && !starts_cluster(c)
        {
            last.source.push(c);
            last.range.end = position + 1;
            continue;
        }
        clusters.push(Cluster {
            source: c.to_string(),
            range: position..position + 1,
            normalized: String::new(),
        });
    }
    for cluster in &mut clusters {
        cluster.normalized = normalize(&cluster.source);
    }
    clusters
}

fn concatenates_to(clusters: &[Cluster], whole: &str) -> bool {
    let mut rest = whole;
    for cluster in clusters {
        match rest.strip_prefix(cluster.normalized.as_str()) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }
    rest.is_empty()
}

/// Fuse each cluster into its predecessor when normalizing the pair
/// differs from normalizing them apart (two-part Indic vowels, for
/// instance, compose from class 0 characters).
fn merge_interacting(clusters: Vec<Cluster>) -> Vec<Cluster> {
    let mut merged: Vec<Cluster> = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        if let Some(last) = merged.last_mut() {
            let source = format!("{}{}", last.source, cluster.source);
            let normalized = normalize(&source);
            if normalized != format!("{}{}", last.normalized, cluster.normalized)
            {
                last.source = source;
                last.range.end = cluster.range.end;
                last.normalized = normalized;
                continue;
            }
        }
        merged.push(cluster);
    }
    merged
}

/// Whether `c` begins a new normalization cluster.
///
/// Decided on the first character of its compatibility decomposition:
/// halfwidth sound marks become combining marks and compatibility jamo
/// become conjoining jamo, and both attach to the preceding character.
fn starts_cluster(c: char) -> bool {
    let lead = leading_char(c);
    canonical_combining_class(lead) == 0 && !is_conjoining_jamo(lead)
}

fn leading_char(c: char) -> char {
    let mut lead = None;
    decompose_compatible(c, |d| {
        lead.get_or_insert(d);
    });
    lead.unwrap_or(c)
}

fn is_conjoining_jamo(c: char) -> bool {
    matches!(c, '\u{1160}'..='\u{11FF}' | '\u{D7B0}'..='\u{D7FF}')
}
