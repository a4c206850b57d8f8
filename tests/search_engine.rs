use notelens::{
    Corpus,
    HighlightSpan,
    analytics,
    attachment::{AttachmentLinker, FolderDomainRule},
    highlight::highlight,
    search_attachments,
    search_notes,
    text_util::Markup,
};

const ARCHIVE: &str = r#"[
    {"html_file": "내 노트/2016 가족 여행.html", "files": ["제주 1.jpg", "일정.pdf"], "folder": "내 노트"},
    {"html_file": "내 노트/가족(여행) 계획.html", "files": [], "folder": "내 노트"},
    {"html_file": "내 노트 (8)/시놀로지 NAS 설정.html", "files": ["nas-guide.pdf", "cable.jpg"], "folder": "내 노트 (8)"},
    {"html_file": "업무/회의록 2019.html", "files": ["회의.hwp"], "folder": "업무"}
]"#;

fn corpus() -> Corpus {
    Corpus::from_json_str(ARCHIVE).unwrap()
}

#[test]
fn family_trip_matches_spaced_and_parenthesized_titles() {
    let corpus = corpus();

    for query in ["가족여행", "가족 여행", "가족(여행)"] {
        let outcome = search_notes(&corpus, query);
        let titles: Vec<&str> =
            outcome.hits.iter().map(|h| h.record.title()).collect();
        assert_eq!(titles.len(), 2, "{query}: {titles:?}");
        assert!(titles.contains(&"내 노트/2016 가족 여행.html"));
        assert!(titles.contains(&"내 노트/가족(여행) 계획.html"));
    }
}

#[test]
fn ranks_are_dense_and_ordered() {
    let corpus = corpus();
    let outcome = search_notes(&corpus, "가족 여행");

    let ranks: Vec<usize> = outcome.hits.iter().map(|h| h.rank).collect();
    assert_eq!(ranks, vec![1, 2]);
    for pair in outcome.hits.windows(2) {
        assert!(
            (pair[0].highlight_count, pair[0].score)
                >= (pair[1].highlight_count, pair[1].score)
        );
    }
}

#[test]
fn rendered_title_highlights_each_word() {
    let corpus = corpus();
    let outcome = search_notes(&corpus, "가족 여행");
    let hit = outcome
        .hits
        .iter()
        .find(|h| h.record.title().contains("계획"))
        .unwrap();

    assert_eq!(
        outcome.render(hit.record.title(), Markup::HTML),
        "내 노트/<mark>가족</mark>(<mark>여행</mark>) 계획.html"
    );
}

#[test]
fn query_is_case_and_width_insensitive() {
    let corpus = corpus();
    for query in ["nas", "NAS", "ＮＡＳ"] {
        let outcome = search_notes(&corpus, query);
        assert_eq!(outcome.hits.len(), 1, "{query}");
        assert!(outcome.hits[0].record.title().contains("NAS"));
    }
}

#[test]
fn attachment_names_are_searchable() {
    let corpus = corpus();
    let outcome = search_notes(&corpus, "일정");
    assert_eq!(outcome.hits.len(), 1);
    assert!(outcome.hits[0].record.title().contains("2016"));
}

#[test]
fn empty_query_lists_everything() {
    let corpus = corpus();
    assert_eq!(search_notes(&corpus, "  ").hits.len(), corpus.len());
    assert_eq!(
        search_attachments(&corpus, "").hits.len(),
        corpus.attachment_entries().count()
    );
}

#[test]
fn attachment_search_links_remote_folders() {
    let corpus = corpus();
    let linker = AttachmentLinker::new([(
        "notes.example",
        vec![FolderDomainRule {
            domain: "https://nas.example/".to_string(),
            folders: vec!["내 노트 (8)".to_string()],
        }],
    )]);

    let outcome = search_attachments(&corpus, "nas");
    let first = &outcome.hits[0];
    assert_eq!(first.entry.name(), "nas-guide.pdf");

    let url = linker.url(first.entry.record(), first.entry.name(), "notes.example");
    assert!(url.starts_with("https://nas.example/"));
    assert!(url.ends_with("%20files/nas-guide.pdf"));

    for host in ["localhost", "unlisted.example"] {
        let url = linker.url(first.entry.record(), first.entry.name(), host);
        assert!(!url.starts_with("https://"), "{host}: {url}");
    }
}

#[test]
fn highlight_offsets_are_characters_not_bytes() {
    let spans = highlight("회의록 2019", &["2019"]);
    assert_eq!(spans, vec![HighlightSpan::new(4, 8)]);
}

#[test]
fn analytics_over_archive() {
    let corpus = corpus();

    let summary = analytics::folder_summary(&corpus);
    assert_eq!(summary.folders[0].folder, "내 노트");
    assert_eq!(summary.folders[0].docs, 2);

    let years: Vec<u16> =
        analytics::timeline(&corpus).iter().map(|y| y.year).collect();
    assert_eq!(years, vec![2016, 2019]);

    let dist =
        analytics::tag_distribution(&corpus, &analytics::default_tag_rules());
    let family = dist.tags.iter().find(|t| t.tag == "life/family").unwrap();
    assert_eq!(family.count, 2);
}
