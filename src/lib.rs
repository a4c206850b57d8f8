//! notelens - keyword search and highlighting for exported note archives.
//!
//! An archive export lists every note page together with its attachment
//! file names. notelens loads that index into memory, ranks notes (or
//! individual attachments) against free-form multi-keyword queries, and
//! reports where each keyword occurs so a viewer can highlight it. Both
//! sides are compared after Unicode compatibility normalization and case
//! folding, and a query keyword also matches across whitespace and
//! parentheses in the text.
//!
//! # Quick start
//!
//! ```
//! use notelens::{Corpus, NoteEntry};
//! use notelens::search;
//! use notelens::text_util::Markup;
//!
//! let corpus = Corpus::from_entries([
//!     NoteEntry::new("2016 가족 여행", ["제주.jpg"], "내 노트"),
//!     NoteEntry::new("회의록", Vec::<String>::new(), "내 노트"),
//! ]);
//!
//! let outcome = search::search_notes(&corpus, "가족여행");
//! assert_eq!(outcome.hits.len(), 1);
//!
//! let hit = &outcome.hits[0];
//! assert_eq!(
//!     outcome.render(hit.record.title(), Markup::HTML),
//!     "2016 <mark>가족 여행</mark>"
//! );
//! ```

pub mod analytics;
pub mod attachment;
pub mod corpus;
pub mod data_dir;
pub mod error;
pub mod highlight;
pub mod normalize;
pub mod query;
pub mod record_id;
pub mod scoring;
pub mod search;
pub mod text_util;
pub mod views;

pub use corpus::{AttachmentEntry, Corpus, NoteEntry, Record};
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use highlight::HighlightSpan;
pub use query::CompiledQuery;
pub use record_id::RecordId;
pub use search::{SearchOutcome, search_attachments, search_notes};
