// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - enqueue: extract links from a saved page and enqueue them into an
//   in-memory queue, printing one outcome per request
// - match: check which pattern (if any) a URL would be routed by
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "link-enqueuer",
    version = "0.1.0",
    about = "Extract links from a page, filter them with URL patterns and enqueue them as crawl requests",
    long_about = "link-enqueuer runs the link-discovery stage of a crawler offline: it reads a saved \
                  HTML document (or a recording of a rendered page), keeps the links that match \
                  your URL patterns and reports what a request queue would do with each of them."
)]
pub struct Cli {
    /// Log pipeline decisions (matches, drops, batches) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, filter and enqueue the links of one page
    ///
    /// Example: link-enqueuer enqueue --document page.html --base-url https://example.com/ \
    ///          --pattern "https://example.com/products/[.*]" --limit 20
    Enqueue(EnqueueArgs),

    /// Show which pattern matches each URL
    ///
    /// Example: link-enqueuer match --pattern "https://example.com/[.*]" https://example.com/a
    Match(MatchArgs),
}

#[derive(Args, Debug)]
pub struct EnqueueArgs {
    /// Static HTML document to read links from ("-" reads stdin)
    #[arg(long, value_name = "FILE")]
    pub document: Option<PathBuf>,

    /// JSON recording of a rendered page's link targets
    #[arg(long, value_name = "FILE")]
    pub page_snapshot: Option<PathBuf>,

    /// Base URL for resolving relative links in documents
    #[arg(long)]
    pub base_url: Option<String>,

    /// CSS selector for the elements to read links from (default: "a")
    #[arg(long)]
    pub selector: Option<String>,

    /// URL pattern to include; "[...]" groups are regular expressions (repeatable)
    #[arg(long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Regular expression to include (repeatable)
    #[arg(long = "regex", value_name = "REGEX")]
    pub regexes: Vec<String>,

    /// URL pattern to exclude (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub excludes: Vec<String>,

    /// Enqueue at most this many requests
    #[arg(long)]
    pub limit: Option<usize>,

    /// Label stored in every request's user data
    #[arg(long)]
    pub label: Option<String>,

    /// Keep URL fragments (#...) in unique keys
    #[arg(long)]
    pub keep_fragment: bool,

    /// Add requests to the head of the queue
    #[arg(long)]
    pub forefront: bool,

    /// TOML file with enqueue options; flags are applied on top
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// URLs to check
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// URL pattern (repeatable)
    #[arg(long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Regular expression (repeatable)
    #[arg(long = "regex", value_name = "REGEX")]
    pub regexes: Vec<String>,
}
