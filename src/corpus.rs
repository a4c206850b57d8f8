//! The in-memory note corpus and its loader.
//!
//! Records are built once, with their [`ViewSet`]s, and never change
//! afterwards; searches only ever borrow them.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    record_id::RecordId,
    views::ViewSet,
};

/// One note as delivered by the archive export (`files_info.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NoteEntry {
    #[serde(rename = "html_file", default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(rename = "files", default, deserialize_with = "lenient_names")]
    pub attachments: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub folder: String,
}

impl NoteEntry {
    pub fn new(
        title: impl Into<String>,
        attachments: impl IntoIterator<Item = impl Into<String>>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            attachments: attachments.into_iter().map(Into::into).collect(),
            folder: folder.into(),
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything other than an array of names counts as "no attachments";
/// non-string items inside the array are dropped.
fn lenient_names<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(names)
}

/// A loaded note with its precomputed comparison views.
#[derive(Debug, Clone)]
pub struct Record {
    id: RecordId,
    title: String,
    attachments: Vec<String>,
    folder: String,
    title_views: ViewSet,
    attachment_views: Vec<ViewSet>,
}

impl Record {
    pub fn new(id: RecordId, entry: NoteEntry) -> Self {
        let title_views = ViewSet::new(&entry.title);
        let attachment_views =
            entry.attachments.iter().map(|a| ViewSet::new(a)).collect();
        Self {
            id,
            title: entry.title,
            attachments: entry.attachments,
            folder: entry.folder,
            title_views,
            attachment_views,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    /// Opaque grouping key; only the attachment linker looks at it.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn title_views(&self) -> &ViewSet {
        &self.title_views
    }

    pub fn attachment_views(&self) -> &[ViewSet] {
        &self.attachment_views
    }

    /// Title views followed by every attachment's views.
    pub fn views(&self) -> impl Iterator<Item = &ViewSet> {
        std::iter::once(&self.title_views).chain(&self.attachment_views)
    }

    /// The texts a list rendering of this record displays.
    pub fn rendered_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str())
            .chain(self.attachments.iter().map(String::as_str))
    }
}

/// One attachment of a record, addressed by its position.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentEntry<'a> {
    record: &'a Record,
    position: usize,
}

impl<'a> AttachmentEntry<'a> {
    pub fn record(&self) -> &'a Record {
        self.record
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn name(&self) -> &'a str {
        &self.record.attachments[self.position]
    }

    /// The attachment's own views followed by its parent title's.
    pub fn views(&self) -> impl Iterator<Item = &'a ViewSet> + use<'a> {
        let record = self.record;
        [&record.attachment_views[self.position], &record.title_views]
            .into_iter()
    }

    pub fn rendered_fields(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        [self.name(), self.record.title()].into_iter()
    }
}

/// All records of one browsing session, in load order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<Record>,
}

impl Corpus {
    /// Build a corpus, assigning ids in iteration order.
    pub fn from_entries(entries: impl IntoIterator<Item = NoteEntry>) -> Self {
        let records = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| Record::new(RecordId::new(index), entry))
            .collect();
        Self { records }
    }

    /// Parse an archive index.
    ///
    /// Accepts either an array of note objects or an object keyed by note
    /// path. Entries that are not objects are skipped with a warning; in
    /// the keyed form the key stands in for a missing `html_file`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<NoteEntry> = match serde_json::from_str(json)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| parse_entry(item, None))
                .collect(),
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(key, item)| parse_entry(item, Some(key)))
                .collect(),
            other => {
                return Err(Error::Config(format!(
                    "corpus must be a JSON array or object, found {}",
                    json_kind(&other)
                )));
            }
        };
        Ok(Self::from_entries(entries))
    }

    /// Read and parse a corpus file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound {
                    kind: "corpus",
                    name: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let corpus = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            records = corpus.len(),
            "loaded corpus"
        );
        Ok(corpus)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every `(record, attachment)` pair, record order then attachment
    /// order.
    pub fn attachment_entries(&self) -> impl Iterator<Item = AttachmentEntry<'_>> {
        self.records.iter().flat_map(|record| {
            (0..record.attachments.len())
                .map(move |position| AttachmentEntry { record, position })
        })
    }
}

fn parse_entry(item: Value, key: Option<String>) -> Option<NoteEntry> {
    if !item.is_object() {
        warn!(kind = json_kind(&item), "skipping non-object corpus entry");
        return None;
    }
    match serde_json::from_value::<NoteEntry>(item) {
        Ok(mut entry) => {
            if entry.title.is_empty()
                && let Some(key) = key
            {
                entry.title = key;
            }
            Some(entry)
        }
        Err(e) => {
            debug!(error = %e, "skipping malformed corpus entry");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_form() {
        let corpus = Corpus::from_json_str(
            r#"[
                {"html_file": "내 노트/여행.html", "files": ["a.jpg"], "folder": "내 노트"},
                {"html_file": "memo.html", "files": [], "folder": "x"}
            ]"#,
        )
        .unwrap();

        assert_eq!(corpus.len(), 2);
        let first = &corpus.records()[0];
        assert_eq!(first.id(), RecordId::new(0));
        assert_eq!(first.title(), "내 노트/여행.html");
        assert_eq!(first.attachments(), &["a.jpg".to_string()]);
        assert_eq!(first.folder(), "내 노트");
    }

    #[test]
    fn parses_keyed_form_in_document_order() {
        let corpus = Corpus::from_json_str(
            r#"{
                "z.html": {"files": ["1.pdf"], "folder": "f"},
                "a.html": {"html_file": "explicit.html", "files": ["2.pdf"]}
            }"#,
        )
        .unwrap();

        let titles: Vec<&str> =
            corpus.records().iter().map(Record::title).collect();
        assert_eq!(titles, vec!["z.html", "explicit.html"]);
    }

    #[test]
    fn missing_or_malformed_files_mean_no_attachments() {
        let corpus = Corpus::from_json_str(
            r#"[
                {"html_file": "a"},
                {"html_file": "b", "files": null},
                {"html_file": "c", "files": "oops"},
                {"html_file": "d", "files": ["ok.txt", 3, null]}
            ]"#,
        )
        .unwrap();

        let counts: Vec<usize> = corpus
            .records()
            .iter()
            .map(|r| r.attachments().len())
            .collect();
        assert_eq!(counts, vec![0, 0, 0, 1]);
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let corpus =
            Corpus::from_json_str(r#"[1, "x", {"html_file": "kept"}]"#)
                .unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.records()[0].id(), RecordId::new(0));
    }

    #[test]
    fn scalar_root_is_rejected() {
        let err = Corpus::from_json_str("42").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = Corpus::from_json_str("[{").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn load_missing_file_reports_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Corpus::load(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "corpus", .. }));
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("files_info.json");
        std::fs::write(&path, r#"[{"html_file": "hello", "files": []}]"#)
            .unwrap();

        let corpus = Corpus::load(&path).unwrap();
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn record_views_cover_title_and_attachments() {
        let record = Record::new(
            RecordId::new(0),
            NoteEntry::new("Trip (Jeju)", ["Photo 1.JPG"], ""),
        );
        let fulls: Vec<&str> = record.views().map(ViewSet::full).collect();
        assert_eq!(fulls, vec!["trip (jeju)", "photo 1.jpg"]);

        let fields: Vec<&str> = record.rendered_fields().collect();
        assert_eq!(fields, vec!["Trip (Jeju)", "Photo 1.JPG"]);
    }

    #[test]
    fn attachment_entries_flatten_in_order() {
        let corpus = Corpus::from_entries([
            NoteEntry::new("a", ["1", "2"], ""),
            NoteEntry::new("b", Vec::<String>::new(), ""),
            NoteEntry::new("c", ["3"], ""),
        ]);

        let pairs: Vec<(&str, &str)> = corpus
            .attachment_entries()
            .map(|e| (e.record().title(), e.name()))
            .collect();
        assert_eq!(pairs, vec![("a", "1"), ("a", "2"), ("c", "3")]);
    }

    #[test]
    fn get_by_id() {
        let corpus = Corpus::from_entries([NoteEntry::new(
            "only",
            Vec::<String>::new(),
            "",
        )]);
        assert_eq!(corpus.get(RecordId::new(0)).unwrap().title(), "only");
        assert!(corpus.get(RecordId::new(1)).is_none());
    }
}
