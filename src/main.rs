use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, HighlightArgs, SearchArgs, TagArgs, WordsArgs};
use notelens::{
    Corpus,
    DataDir,
    analytics::{self, TagRule, TokenizeOptions},
    attachment::{AttachmentLinker, MediaKind},
    error,
    highlight,
    query::CompiledQuery,
    search::{self, AttachmentHitSummary},
    text_util::{self, Markup},
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("NOTELENS_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match &cli.command {
        Command::Completions(args) => {
            args.generate();
        }
        Command::Highlight(args) => {
            cmd_highlight(args)?;
        }
        Command::Search(args) => {
            let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
            let corpus = load_corpus(&cli, &data_dir)?;
            if args.attachments {
                let linker = load_linker(&data_dir)?;
                cmd_search_attachments(&corpus, &linker, args)?;
            } else {
                cmd_search_notes(&corpus, args)?;
            }
        }
        Command::Stats(args) => {
            let corpus = load_corpus_only(&cli)?;
            cmd_stats(&corpus, args.json)?;
        }
        Command::Timeline(args) => {
            let corpus = load_corpus_only(&cli)?;
            cmd_timeline(&corpus, args.json)?;
        }
        Command::Tags(args) => {
            let corpus = load_corpus_only(&cli)?;
            let rules = load_tag_rules(&cli, args)?;
            cmd_tags(&corpus, &rules, args.json)?;
        }
        Command::Graph(args) => {
            let corpus = load_corpus_only(&cli)?;
            let rules = load_tag_rules(&cli, args)?;
            cmd_graph(&corpus, &rules, args.json)?;
        }
        Command::Words(args) => {
            let corpus = load_corpus_only(&cli)?;
            cmd_words(&corpus, args)?;
        }
    }

    Ok(())
}

fn corpus_path(cli: &Cli, data_dir: &DataDir) -> PathBuf {
    cli.corpus.clone().unwrap_or_else(|| data_dir.corpus_file())
}

fn load_corpus(cli: &Cli, data_dir: &DataDir) -> error::Result<Corpus> {
    Corpus::load(&corpus_path(cli, data_dir))
}

/// Load the corpus without touching the data directory when `--corpus`
/// names the file directly.
fn load_corpus_only(cli: &Cli) -> error::Result<Corpus> {
    match &cli.corpus {
        Some(path) => Corpus::load(path),
        None => {
            let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
            load_corpus(cli, &data_dir)
        }
    }
}

fn load_linker(data_dir: &DataDir) -> error::Result<AttachmentLinker> {
    let path = data_dir.host_rules_file();
    if !path.is_file() {
        debug!(path = %path.display(), "no attachment host rules");
        return Ok(AttachmentLinker::default());
    }
    AttachmentLinker::load(&path)
}

/// `--rules` if given, else `tag_rules.json` in the data directory, else
/// the built-in rules.
fn load_tag_rules(cli: &Cli, args: &TagArgs) -> error::Result<Vec<TagRule>> {
    if let Some(path) = &args.rules {
        return analytics::load_tag_rules(path);
    }
    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let path = data_dir.tag_rules_file();
    if !path.is_file() {
        debug!(path = %path.display(), "no tag rules file, using built-in rules");
        return Ok(analytics::default_tag_rules());
    }
    analytics::load_tag_rules(&path)
}

fn markup(html: bool) -> Markup {
    if html { Markup::HTML } else { Markup::BRACKETS }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_highlight(args: &HighlightArgs) -> error::Result<()> {
    let query = CompiledQuery::compile(&args.query);
    let spans = highlight::highlight(&args.text, query.highlight_keywords());

    if args.json {
        #[derive(Serialize)]
        struct Output<'a> {
            query: &'a CompiledQuery,
            spans: &'a [highlight::HighlightSpan],
        }
        print_json(&Output {
            query: &query,
            spans: &spans,
        })?;
    } else {
        println!(
            "{}",
            text_util::render_highlighted(&args.text, &spans, markup(args.html))
        );
    }
    Ok(())
}

fn cmd_search_notes(corpus: &Corpus, args: &SearchArgs) -> error::Result<()> {
    let mut outcome = search::search_notes(corpus, &args.query);
    let total = outcome.hits.len();
    if let Some(limit) = args.limit() {
        outcome.truncate(limit);
    }

    if args.json {
        return print_json(&outcome.summaries());
    }
    if outcome.hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let markup = markup(args.html);
    for hit in &outcome.hits {
        println!(
            "{:>3}. {} (score: {}, highlights: {})",
            hit.rank,
            outcome.render(hit.record.title(), markup),
            hit.score,
            hit.highlight_count,
        );
        for name in hit.record.attachments() {
            println!("       - {}", outcome.render(name, markup));
        }
    }
    if total > outcome.hits.len() {
        println!("\n{} of {total} result(s)", outcome.hits.len());
    }
    Ok(())
}

fn cmd_search_attachments(
    corpus: &Corpus,
    linker: &AttachmentLinker,
    args: &SearchArgs,
) -> error::Result<()> {
    let mut outcome = search::search_attachments(corpus, &args.query);
    if let Some(limit) = args.limit() {
        outcome.truncate(limit);
    }
    let host = args.host.as_deref().unwrap_or("");

    if args.json {
        #[derive(Serialize)]
        struct Linked {
            #[serde(flatten)]
            hit: AttachmentHitSummary,
            url: String,
        }
        let linked: Vec<Linked> = outcome
            .hits
            .iter()
            .zip(outcome.summaries())
            .map(|(hit, summary)| Linked {
                url: linker.url(hit.entry.record(), hit.entry.name(), host),
                hit: summary,
            })
            .collect();
        return print_json(&linked);
    }
    if outcome.hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let markup = markup(args.html);
    for hit in &outcome.hits {
        let record = hit.entry.record();
        let kind = match MediaKind::of(hit.entry.name()) {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Other => "file",
        };
        println!(
            "{:>3}. {} [{kind}] (score: {}, highlights: {})",
            hit.rank,
            outcome.render(hit.entry.name(), markup),
            hit.score,
            hit.highlight_count,
        );
        println!("       in {}", outcome.render(record.title(), markup));
        println!("       {}", linker.url(record, hit.entry.name(), host));
    }
    Ok(())
}

fn cmd_stats(corpus: &Corpus, json: bool) -> error::Result<()> {
    let summary = analytics::folder_summary(corpus);
    if json {
        return print_json(&summary);
    }

    println!("Notes: {}", corpus.len());
    println!("Folders:");
    for f in &summary.folders {
        println!(
            "  {}\t{} notes, {} attachments, {}% with attachments",
            f.folder, f.docs, f.attachments, f.attach_rate
        );
    }
    println!("Extensions:");
    for e in &summary.extensions {
        println!("  {}\t{}", e.ext, e.count);
    }
    Ok(())
}

fn cmd_timeline(corpus: &Corpus, json: bool) -> error::Result<()> {
    let rows = analytics::timeline(corpus);
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No dated notes.");
    }
    for row in &rows {
        println!(
            "{}\t{} notes, {} images, {} other",
            row.year, row.docs, row.images, row.others
        );
    }
    Ok(())
}

fn cmd_tags(corpus: &Corpus, rules: &[TagRule], json: bool) -> error::Result<()> {
    let dist = analytics::tag_distribution(corpus, rules);
    if json {
        return print_json(&dist);
    }

    println!("Tags:");
    for t in &dist.tags {
        println!("  {}\t{}", t.tag, t.count);
    }
    println!("Attachment types:");
    for t in &dist.sub_tags {
        println!("  {}\t{}", t.tag, t.count);
    }
    Ok(())
}

fn cmd_graph(corpus: &Corpus, rules: &[TagRule], json: bool) -> error::Result<()> {
    let graph = analytics::knowledge_graph(corpus, rules);
    if json {
        return print_json(&graph);
    }

    let tags = graph
        .nodes
        .iter()
        .filter(|n| n.kind == analytics::NodeKind::Tag)
        .count();
    println!(
        "{} nodes ({} notes, {tags} tags), {} links",
        graph.nodes.len(),
        graph.nodes.len() - tags,
        graph.links.len()
    );
    for link in &graph.links {
        println!("  {} -> {}", link.source, link.target);
    }
    Ok(())
}

fn cmd_words(corpus: &Corpus, args: &WordsArgs) -> error::Result<()> {
    let opts = TokenizeOptions {
        lowercase: !args.keep_case,
        strip_years: !args.keep_years,
        stopwords: args.stopwords.iter().cloned().collect(),
    };
    let mut words = analytics::word_frequencies(corpus, &opts);
    words.truncate(args.count);

    if args.json {
        return print_json(&words);
    }
    for w in &words {
        println!("{}\t{}", w.value, w.text);
    }
    Ok(())
}
