//! Corpus-wide statistics derived from titles and attachment names.
//!
//! Everything here is plain data meant for JSON export or a terminal
//! table; no rendering happens in this module.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::{
    attachment::extension_of,
    corpus::Corpus,
    error::{Error, Result},
    normalize::normalize,
};

/// Extensions counted as pictures by the summary views. Narrower than
/// [`crate::attachment::MediaKind::Image`].
const PICTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Punctuation replaced by a space before splitting file names into words.
const WORD_SEPARATORS: &[char] = &[
    '[', ']', '{', '}', '(', ')', '<', '>', ':', ';', ',', '.', '!', '?', '"',
    '\'', '`', '~', '@', '#', '$', '%', '^', '&', '*', '+', '=', '\\', '/',
    '|', '_',
];

/// Last `/`-separated segment of a note path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderStats {
    pub folder: String,
    pub docs: usize,
    pub attachments: usize,
    pub docs_with_attachments: usize,
    /// Share of notes with at least one attachment, in whole percent.
    pub attach_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionCount {
    pub ext: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    pub folders: Vec<FolderStats>,
    pub extensions: Vec<ExtensionCount>,
}

/// Per-folder note and attachment counts plus the extension histogram.
///
/// Folders are ordered by note count (descending) and then name;
/// extensions by count and then extension. Attachments without an
/// extension are left out of the histogram.
pub fn folder_summary(corpus: &Corpus) -> FolderSummary {
    let mut by_folder: HashMap<&str, (usize, usize, usize)> = HashMap::new();
    let mut by_ext: HashMap<String, usize> = HashMap::new();

    for record in corpus.records() {
        let attached = record.attachments().len();
        let entry = by_folder.entry(record.folder()).or_default();
        entry.0 += 1;
        entry.1 += attached;
        if attached > 0 {
            entry.2 += 1;
        }
        for name in record.attachments() {
            let ext = extension_of(name);
            if !ext.is_empty() {
                *by_ext.entry(ext).or_default() += 1;
            }
        }
    }

    let mut folders: Vec<FolderStats> = by_folder
        .into_iter()
        .map(|(folder, (docs, attachments, with))| FolderStats {
            folder: folder.to_string(),
            docs,
            attachments,
            docs_with_attachments: with,
            attach_rate: percent(with, docs),
        })
        .collect();
    folders.sort_by(|a, b| b.docs.cmp(&a.docs).then_with(|| a.folder.cmp(&b.folder)));

    let mut extensions: Vec<ExtensionCount> = by_ext
        .into_iter()
        .map(|(ext, count)| ExtensionCount { ext, count })
        .collect();
    extensions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ext.cmp(&b.ext)));

    FolderSummary {
        folders,
        extensions,
    }
}

/// `part / whole` as a percentage, rounded half up.
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part * 200 + whole) / (whole * 2)) as u32
}

/// Attachment-type markers for one note.
///
/// ```
/// use notelens::analytics::sub_tags;
///
/// assert_eq!(
///     sub_tags(&["a.PDF", "b.hwp", "c.jpg"]),
///     vec!["has_pdf", "has_hanword", "has_images"]
/// );
/// ```
pub fn sub_tags<S: AsRef<str>>(files: &[S]) -> Vec<&'static str> {
    let exts: HashSet<String> =
        files.iter().map(|f| extension_of(f.as_ref())).collect();
    let any = |list: &[&str]| list.iter().any(|e| exts.contains(*e));

    let table: [(&'static str, &[&str]); 8] = [
        ("has_pdf", &["pdf"]),
        ("has_hanword", &["hwp", "hwpx"]),
        ("has_docx", &["docx"]),
        ("has_images", PICTURE_EXTENSIONS),
        ("has_archives", &["zip", "rar"]),
        ("has_mht", &["mht", "mhtml"]),
        ("has_audio", &["wma", "mp3", "wav"]),
        ("has_spreadsheet", &["xlsx", "xls", "csv"]),
    ];
    table
        .into_iter()
        .filter(|(_, list)| any(list))
        .map(|(tag, _)| tag)
        .collect()
}

/// Assigns `tag` to notes whose file name contains any of `keywords`,
/// compared after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: String,
    pub keywords: Vec<String>,
}

impl TagRule {
    pub fn new(
        tag: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            tag: tag.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// `name` must already be normalized.
    fn matches(&self, name: &str) -> bool {
        self.keywords.iter().any(|keyword| {
            let keyword = normalize(keyword);
            !keyword.is_empty() && name.contains(keyword.as_str())
        })
    }
}

/// The built-in topic rules for a Korean personal note archive.
pub fn default_tag_rules() -> Vec<TagRule> {
    vec![
        TagRule::new(
            "tech/dev",
            [
                "Android", "안드로이드", "Webview", "AsyncTask", "Eclipse",
                "Xdebug", "Gradle", "jQuery", "JavaScript", "PowerShell",
                "WSH", "NAVER Tech Talk", "디버깅",
            ],
        ),
        TagRule::new(
            "life/family",
            ["연서", "가족", "어린이집", "증명사진", "아기새", "여권"],
        ),
        TagRule::new(
            "legal/admin",
            [
                "주차단속", "집매매", "철수확인서", "인수인계", "계약서",
                "의견진술", "익명신고", "윤리경영", "공정위",
                "1종 보통 적성검사",
            ],
        ),
        TagRule::new("health", ["비염", "안약", "헤르페스", "건강"]),
        TagRule::new(
            "idea/project",
            ["아이디어", "계획", "TODO", "솔루션", "관리툴", "아이템"],
        ),
        TagRule::new(
            "society/thought",
            [
                "정약용", "주52시간", "뉴스", "철학", "사회", "매일경제",
                "Chosunbiz",
            ],
        ),
        TagRule::new(
            "hardware/it",
            ["NAS", "시놀로지", "DLNA", "랜선", "UTP", "FTP", "케이블"],
        ),
    ]
}

/// Read tag rules from a JSON array of `{ "tag", "keywords" }` objects.
pub fn load_tag_rules(path: &Path) -> Result<Vec<TagRule>> {
    let json = std::fs::read_to_string(path)?;
    let rules: Vec<TagRule> = serde_json::from_str(&json).map_err(|e| {
        Error::Config(format!("invalid tag rules in {}: {e}", path.display()))
    })?;
    debug!(path = %path.display(), rules = rules.len(), "loaded tag rules");
    Ok(rules)
}

/// Topic tags of one note path, in rule order without duplicates.
pub fn tags_for<'r>(path: &str, rules: &'r [TagRule]) -> Vec<&'r str> {
    let name = normalize(file_name(path));
    let mut tags: Vec<&str> = Vec::new();
    for rule in rules {
        if rule.matches(&name) && !tags.contains(&rule.tag.as_str()) {
            tags.push(&rule.tag);
        }
    }
    tags
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteTags {
    pub title: String,
    pub folder: String,
    pub tags: Vec<String>,
    pub sub_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDistribution {
    pub tags: Vec<TagCount>,
    pub sub_tags: Vec<TagCount>,
    pub notes: Vec<NoteTags>,
}

/// Count topic tags and attachment markers over the whole corpus.
pub fn tag_distribution(corpus: &Corpus, rules: &[TagRule]) -> TagDistribution {
    let mut tag_counts: HashMap<String, usize> = HashMap::new();
    let mut sub_counts: HashMap<String, usize> = HashMap::new();
    let mut notes = Vec::with_capacity(corpus.len());

    for record in corpus.records() {
        let tags: Vec<String> = tags_for(record.title(), rules)
            .into_iter()
            .map(str::to_string)
            .collect();
        let subs: Vec<String> = sub_tags(record.attachments())
            .into_iter()
            .map(str::to_string)
            .collect();
        for tag in &tags {
            *tag_counts.entry(tag.clone()).or_default() += 1;
        }
        for sub in &subs {
            *sub_counts.entry(sub.clone()).or_default() += 1;
        }
        notes.push(NoteTags {
            title: record.title().to_string(),
            folder: record.folder().to_string(),
            tags,
            sub_tags: subs,
        });
    }

    TagDistribution {
        tags: sorted_counts(tag_counts),
        sub_tags: sorted_counts(sub_counts),
        notes,
    }
}

fn sorted_counts(counts: HashMap<String, usize>) -> Vec<TagCount> {
    let mut out: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Tag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Notes linked to the topic tags their file names carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl KnowledgeGraph {
    /// Add a node unless one with the same id exists.
    fn add_node(&mut self, seen: &mut HashSet<String>, id: &str, kind: NodeKind) {
        if seen.insert(id.to_string()) {
            self.nodes.push(GraphNode {
                id: id.to_string(),
                kind,
            });
        }
    }
}

/// One file node per note (keyed by its path), one tag node per tag that
/// occurs, and a link from each note to each of its tags.
///
/// Nodes appear in first-seen order. Ids are shared between kinds, so a
/// tag spelled like a note path reuses the note's node.
pub fn knowledge_graph(corpus: &Corpus, rules: &[TagRule]) -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::default();
    let mut seen = HashSet::new();

    for record in corpus.records() {
        let file = record.title();
        graph.add_node(&mut seen, file, NodeKind::File);
        for tag in tags_for(file, rules) {
            graph.add_node(&mut seen, tag, NodeKind::Tag);
            graph.links.push(GraphLink {
                source: file.to_string(),
                target: tag.to_string(),
                weight: 1,
            });
        }
    }
    graph
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearActivity {
    pub year: u16,
    pub docs: usize,
    pub images: usize,
    pub others: usize,
}

/// First standalone `19xx` or `20xx` in `text`.
///
/// Standalone means not adjacent to an ASCII letter, digit or `_`, so
/// `2016가족` yields 2016 while `a2016` and `20161` do not.
pub fn year_in(text: &str) -> Option<u16> {
    let bytes = text.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    (0..bytes.len().saturating_sub(3)).find_map(|at| {
        let window = &bytes[at..at + 4];
        let century = &window[..2];
        if !(century == b"19" || century == b"20")
            || !window.iter().all(u8::is_ascii_digit)
            || (at > 0 && is_word(bytes[at - 1]))
            || bytes.get(at + 4).is_some_and(|&b| is_word(b))
        {
            return None;
        }
        std::str::from_utf8(window).ok()?.parse().ok()
    })
}

/// Notes and attachments per year found in the note title, ascending.
/// Notes without a year are left out.
pub fn timeline(corpus: &Corpus) -> Vec<YearActivity> {
    let mut by_year: BTreeMap<u16, YearActivity> = BTreeMap::new();
    for record in corpus.records() {
        let Some(year) = year_in(record.title()) else {
            continue;
        };
        let row = by_year.entry(year).or_insert(YearActivity {
            year,
            docs: 0,
            images: 0,
            others: 0,
        });
        row.docs += 1;
        for name in record.attachments() {
            if PICTURE_EXTENSIONS.contains(&extension_of(name).as_str()) {
                row.images += 1;
            } else {
                row.others += 1;
            }
        }
    }
    by_year.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeOptions {
    pub lowercase: bool,
    pub strip_years: bool,
    pub stopwords: HashSet<String>,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_years: true,
            stopwords: HashSet::new(),
        }
    }
}

/// Split a file name into words.
///
/// ```
/// use notelens::analytics::{TokenizeOptions, tokenize};
///
/// let words = tokenize("2016_가족 여행(제주).html", &TokenizeOptions::default());
/// assert_eq!(words, vec!["가족", "여행", "제주", "html"]);
/// ```
pub fn tokenize(text: &str, opts: &TokenizeOptions) -> Vec<String> {
    let mut text: String = text.nfc().collect();
    if opts.lowercase {
        text = text.to_lowercase();
    }
    text.split(|c: char| c.is_whitespace() || WORD_SEPARATORS.contains(&c))
        .filter(|word| word.chars().count() >= 2)
        .filter(|word| !(opts.strip_years && is_year(word)))
        .filter(|word| !opts.stopwords.contains(*word))
        .map(str::to_string)
        .collect()
}

fn is_year(word: &str) -> bool {
    word.len() == 4 && year_in(word).is_some()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub text: String,
    pub value: usize,
}

/// Word counts over every note's file name, most frequent first, then
/// alphabetical.
pub fn word_frequencies(corpus: &Corpus, opts: &TokenizeOptions) -> Vec<WordCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in corpus.records() {
        for word in tokenize(file_name(record.title()), opts) {
            *counts.entry(word).or_default() += 1;
        }
    }
    let mut out: Vec<WordCount> = counts
        .into_iter()
        .map(|(text, value)| WordCount { text, value })
        .collect();
    out.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.text.cmp(&b.text)));
    out
}
