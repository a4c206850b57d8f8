use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

const ARCHIVE: &str = r#"[
    {"html_file": "내 노트/2016 가족 여행.html", "files": ["제주.jpg"], "folder": "내 노트"},
    {"html_file": "내 노트/가족(여행) 계획.html", "files": [], "folder": "내 노트"},
    {"html_file": "업무/NAS 설정.html", "files": ["nas.png"], "folder": "업무"}
]"#;

fn notelens_bin() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(bin) = std::env::var("CARGO_BIN_EXE_notelens") {
        return Ok(PathBuf::from(bin));
    }

    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("notelens");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    Ok(path)
}

fn run(data_dir: &Path, args: &[&str]) -> Result<Output, Box<dyn std::error::Error>> {
    let output = Command::new(notelens_bin()?)
        .args(args)
        .env("NOTELENS_DATA_DIR", data_dir)
        .env_remove("NOTELENS_LOG")
        .output()?;
    Ok(output)
}

fn setup_fixture(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(data_dir.join("files_info.json"), ARCHIVE)?;
    Ok(())
}

#[test]
fn search_json_reports_ranked_hits() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let output = run(tempdir.path(), &["search", "가족여행", "--json"])?;
    assert!(output.status.success(), "{output:?}");

    let hits: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let hits = hits.as_array().ok_or("expected array")?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["rank"], 1);
    assert!(hits[0]["title_spans"].as_array().is_some_and(|s| !s.is_empty()));
    Ok(())
}

#[test]
fn search_human_output_brackets_matches() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let output = run(tempdir.path(), &["search", "nas"])?;
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("업무/[NAS] 설정.html"), "{stdout}");
    assert!(stdout.contains("- [nas].png"), "{stdout}");
    Ok(())
}

#[test]
fn explicit_corpus_flag_overrides_data_dir() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = tempfile::tempdir()?;
    let elsewhere = tempfile::tempdir()?;
    let corpus = elsewhere.path().join("archive.json");
    std::fs::write(&corpus, ARCHIVE)?;

    let output = run(
        data_dir.path(),
        &["timeline", "--json", "--corpus", corpus.to_str().ok_or("path")?],
    )?;
    assert!(output.status.success(), "{output:?}");

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(rows[0]["year"], 2016);
    assert_eq!(rows[0]["images"], 1);
    Ok(())
}

#[test]
fn missing_corpus_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;

    let output = run(tempdir.path(), &["stats"])?;
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn highlight_needs_no_corpus() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;

    let output = run(
        tempdir.path(),
        &["highlight", "가족여행", "가족(여행) <계획>", "--html"],
    )?;
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.trim_end(), "<mark>가족(여행</mark>) &lt;계획&gt;");
    Ok(())
}

#[test]
fn graph_json_links_notes_to_tags() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let output = run(tempdir.path(), &["graph", "--json"])?;
    assert!(output.status.success(), "{output:?}");

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let nodes = graph["nodes"].as_array().ok_or("expected nodes")?;
    let links = graph["links"].as_array().ok_or("expected links")?;
    assert_eq!(nodes.len(), 6);
    assert_eq!(links.len(), 4);
    assert_eq!(nodes[0]["id"], "내 노트/2016 가족 여행.html");
    assert_eq!(nodes[0]["type"], "file");
    assert_eq!(nodes[1]["id"], "life/family");
    assert_eq!(nodes[1]["type"], "tag");
    assert!(links.iter().all(|l| l["weight"] == 1));
    Ok(())
}

#[test]
fn tag_rules_file_replaces_builtin_rules() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;
    std::fs::write(
        tempdir.path().join("tag_rules.json"),
        r#"[{"tag": "travel", "keywords": ["여행"]}]"#,
    )?;

    let output = run(tempdir.path(), &["tags", "--json"])?;
    assert!(output.status.success(), "{output:?}");
    let dist: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let tags = dist["tags"].as_array().ok_or("expected tags")?;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["tag"], "travel");
    assert_eq!(tags[0]["count"], 2);

    let explicit = tempdir.path().join("other_rules.json");
    std::fs::write(&explicit, r#"[{"tag": "infra", "keywords": ["nas"]}]"#)?;
    let output = run(
        tempdir.path(),
        &["tags", "--json", "--rules", explicit.to_str().ok_or("path")?],
    )?;
    assert!(output.status.success(), "{output:?}");
    let dist: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(dist["tags"][0]["tag"], "infra");
    assert_eq!(dist["tags"][0]["count"], 1);
    Ok(())
}
