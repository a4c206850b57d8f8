use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "notelens",
    about = "Search and highlight notes in an exported note archive"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Read the archive index from this file instead of the data directory
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search note titles and attachment names
    Search(SearchArgs),
    /// Highlight query keywords in a piece of text
    Highlight(HighlightArgs),
    /// Per-folder note and attachment statistics
    Stats(JsonArgs),
    /// Notes and attachments per year
    Timeline(JsonArgs),
    /// Topic tags and attachment markers
    Tags(TagArgs),
    /// Notes linked to their topic tags, as a node/link graph
    Graph(TagArgs),
    /// Most frequent words in note file names
    Words(WordsArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Return every matching result
    #[arg(long)]
    pub all: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Search individual attachments instead of notes
    #[arg(long)]
    pub attachments: bool,

    /// Mark highlights with <mark> and escape the rest as HTML
    #[arg(long)]
    pub html: bool,

    /// Host the archive is served from, for attachment links
    #[arg(long)]
    pub host: Option<String>,
}

impl SearchArgs {
    /// Maximum number of hits to print, `None` for all.
    pub fn limit(&self) -> Option<usize> {
        (!self.all).then_some(self.count)
    }
}

// -- Highlight --

#[derive(Debug, Parser)]
pub struct HighlightArgs {
    /// The search query
    pub query: String,

    /// Text to highlight
    pub text: String,

    /// Output spans as JSON
    #[arg(long)]
    pub json: bool,

    /// Mark highlights with <mark> and escape the rest as HTML
    #[arg(long)]
    pub html: bool,
}

// -- Reports --

#[derive(Debug, Parser)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct TagArgs {
    /// Read tag rules from this JSON file instead of the data directory
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct WordsArgs {
    /// Number of words to show
    #[arg(short = 'n', long, default_value = "30")]
    pub count: usize,

    /// Ignore this word (can be repeated)
    #[arg(long = "stopword")]
    pub stopwords: Vec<String>,

    /// Count words with their original case
    #[arg(long)]
    pub keep_case: bool,

    /// Count 19xx/20xx years as words
    #[arg(long)]
    pub keep_years: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "notelens",
            &mut std::io::stdout(),
        );
    }
}
