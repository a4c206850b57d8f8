use std::{
    cmp::Ordering,
    sync::atomic::{self, AtomicU64},
};

use serde::Serialize;
use tracing::debug;

use crate::{
    corpus::{AttachmentEntry, Corpus, Record},
    highlight::{self, HighlightSpan},
    query::CompiledQuery,
    record_id::RecordId,
    scoring,
    text_util::{self, Markup},
};

/// A note ranked against a query.
#[derive(Debug, Clone)]
pub struct NoteHit<'a> {
    pub rank: usize,
    pub record: &'a Record,
    pub score: u64,
    pub highlight_count: usize,
}

/// A single attachment ranked against a query.
#[derive(Debug, Clone)]
pub struct AttachmentHit<'a> {
    pub rank: usize,
    pub entry: AttachmentEntry<'a>,
    pub score: u64,
    pub highlight_count: usize,
}

/// Ranked hits together with the compiled query that produced them.
///
/// Renderers re-derive spans for whichever field they display through
/// [`SearchOutcome::spans`].
#[derive(Debug, Clone)]
pub struct SearchOutcome<H> {
    pub query: CompiledQuery,
    pub hits: Vec<H>,
}

impl<H> SearchOutcome<H> {
    /// Highlight spans of the outcome's keywords in `text`.
    pub fn spans(&self, text: &str) -> Vec<HighlightSpan> {
        highlight::highlight(text, self.query.highlight_keywords())
    }

    /// `text` rendered with the outcome's highlights.
    pub fn render(&self, text: &str, markup: Markup) -> String {
        text_util::render_highlighted(text, &self.spans(text), markup)
    }

    /// Keep only the first `count` hits.
    pub fn truncate(&mut self, count: usize) {
        self.hits.truncate(count);
    }
}

/// Rank every note in `corpus` against `raw_query`.
///
/// 1. Compile the query; an empty query returns all notes in load order
/// 2. Drop notes whose match score is zero
/// 3. Order by highlight count, then score (both descending), then title
///    and load position (ascending)
///
/// Titles compare by code point, not by locale collation.
pub fn search_notes<'a>(
    corpus: &'a Corpus,
    raw_query: &str,
) -> SearchOutcome<NoteHit<'a>> {
    let query = CompiledQuery::compile(raw_query);

    if query.is_empty() {
        let hits = corpus
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| NoteHit {
                rank: i + 1,
                record,
                score: 0,
                highlight_count: 0,
            })
            .collect();
        return SearchOutcome { query, hits };
    }

    let mut hits: Vec<NoteHit<'a>> = corpus
        .records()
        .iter()
        .filter_map(|record| {
            let score = scoring::score_record(record, query.match_keywords());
            if score == 0 {
                return None;
            }
            let highlight_count = record
                .rendered_fields()
                .map(|field| {
                    highlight::count_highlights(
                        field,
                        query.highlight_keywords(),
                    )
                })
                .sum();
            Some(NoteHit {
                rank: 0,
                record,
                score,
                highlight_count,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        by_relevance(
            (a.highlight_count, a.score),
            (b.highlight_count, b.score),
        )
        .then_with(|| a.record.title().cmp(b.record.title()))
        .then_with(|| a.record.id().cmp(&b.record.id()))
    });
    assign_ranks(&mut hits, |hit, rank| hit.rank = rank);

    debug!(
        keywords = query.match_keywords().len(),
        hits = hits.len(),
        records = corpus.len(),
        "ranked notes"
    );
    SearchOutcome { query, hits }
}

/// Rank every attachment in `corpus` against `raw_query`.
///
/// Each attachment is matched on its own name and its note's title; ties
/// fall back to attachment name, note title (both by code point), then
/// load position.
pub fn search_attachments<'a>(
    corpus: &'a Corpus,
    raw_query: &str,
) -> SearchOutcome<AttachmentHit<'a>> {
    let query = CompiledQuery::compile(raw_query);

    if query.is_empty() {
        let hits = corpus
            .attachment_entries()
            .enumerate()
            .map(|(i, entry)| AttachmentHit {
                rank: i + 1,
                entry,
                score: 0,
                highlight_count: 0,
            })
            .collect();
        return SearchOutcome { query, hits };
    }

    let mut hits: Vec<AttachmentHit<'a>> = corpus
        .attachment_entries()
        .filter_map(|entry| {
            let score =
                scoring::score_attachment(&entry, query.match_keywords());
            if score == 0 {
                return None;
            }
            let highlight_count = entry
                .rendered_fields()
                .map(|field| {
                    highlight::count_highlights(
                        field,
                        query.highlight_keywords(),
                    )
                })
                .sum();
            Some(AttachmentHit {
                rank: 0,
                entry,
                score,
                highlight_count,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        by_relevance(
            (a.highlight_count, a.score),
            (b.highlight_count, b.score),
        )
        .then_with(|| a.entry.name().cmp(b.entry.name()))
        .then_with(|| a.entry.record().title().cmp(b.entry.record().title()))
        .then_with(|| {
            (a.entry.record().id(), a.entry.position())
                .cmp(&(b.entry.record().id(), b.entry.position()))
        })
    });
    assign_ranks(&mut hits, |hit, rank| hit.rank = rank);

    debug!(
        keywords = query.match_keywords().len(),
        hits = hits.len(),
        "ranked attachments"
    );
    SearchOutcome { query, hits }
}

/// Higher highlight count first, then higher score.
fn by_relevance(a: (usize, u64), b: (usize, u64)) -> Ordering {
    b.cmp(&a)
}

fn assign_ranks<H>(hits: &mut [H], mut set: impl FnMut(&mut H, usize)) {
    for (i, hit) in hits.iter_mut().enumerate() {
        set(hit, i + 1);
    }
}

/// Monotonic query counter for hosts that evaluate queries concurrently.
///
/// Call [`QueryGeneration::begin`] when a query is issued and check
/// [`QueryGeneration::is_current`] before displaying its result; a result
/// whose ticket is no longer current belongs to a superseded query.
#[derive(Debug, Default)]
pub struct QueryGeneration {
    latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

impl QueryGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> QueryTicket {
        QueryTicket(self.latest.fetch_add(1, atomic::Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.latest.load(atomic::Ordering::Acquire) == ticket.0
    }
}

/// Serializable view of a note hit, used for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct NoteHitSummary {
    pub rank: usize,
    pub id: RecordId,
    pub score: u64,
    pub highlight_count: usize,
    pub title: String,
    pub folder: String,
    pub title_spans: Vec<HighlightSpan>,
    pub attachments: Vec<String>,
}

/// Serializable view of an attachment hit, used for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentHitSummary {
    pub rank: usize,
    pub id: RecordId,
    pub score: u64,
    pub highlight_count: usize,
    pub attachment: String,
    pub attachment_spans: Vec<HighlightSpan>,
    pub title: String,
    pub title_spans: Vec<HighlightSpan>,
}

impl SearchOutcome<NoteHit<'_>> {
    pub fn summaries(&self) -> Vec<NoteHitSummary> {
        self.hits
            .iter()
            .map(|hit| NoteHitSummary {
                rank: hit.rank,
                id: hit.record.id(),
                score: hit.score,
                highlight_count: hit.highlight_count,
                title: hit.record.title().to_string(),
                folder: hit.record.folder().to_string(),
                title_spans: self.spans(hit.record.title()),
                attachments: hit.record.attachments().to_vec(),
            })
            .collect()
    }
}

impl SearchOutcome<AttachmentHit<'_>> {
    pub fn summaries(&self) -> Vec<AttachmentHitSummary> {
        self.hits
            .iter()
            .map(|hit| AttachmentHitSummary {
                rank: hit.rank,
                id: hit.entry.record().id(),
                score: hit.score,
                highlight_count: hit.highlight_count,
                attachment: hit.entry.name().to_string(),
                attachment_spans: self.spans(hit.entry.name()),
                title: hit.entry.record().title().to_string(),
                title_spans: self.spans(hit.entry.record().title()),
            })
            .collect()
    }
}
