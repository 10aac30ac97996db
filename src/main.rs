// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = some URLs matched nothing,
//    2 = error)
//
// The enqueue command uses an in-memory queue, so it shows what a real
// queue would be told (new vs. duplicate) without persisting anything.
// =============================================================================

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, EnqueueArgs, MatchArgs};
use link_enqueuer::config::EnqueueConfig;
use link_enqueuer::patterns::{MatchOutcome, PatternSet};
use link_enqueuer::{
    enqueue_links, EnqueueOptions, HtmlDocument, LinkSource, MemoryRequestQueue, PageSnapshot,
    ParsedDocument, QueueOperationInfo, RenderedPage, RequestDescriptor, UrlPattern,
};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Enqueue(args) => handle_enqueue(args).await,
        Commands::Match(args) => handle_match(args),
    }
}

// One line of output: the outcome plus what was enqueued
#[derive(Debug, Serialize)]
struct EnqueuedRequest {
    url: String,
    method: String,
    #[serde(flatten)]
    outcome: QueueOperationInfo,
    #[serde(skip_serializing_if = "Map::is_empty")]
    user_data: Map<String, Value>,
}

// Handles the 'enqueue' subcommand
async fn handle_enqueue(args: EnqueueArgs) -> Result<i32> {
    let options = build_options(&args)?;

    let document = match &args.document {
        Some(path) => Some(HtmlDocument::new(read_input(path).await?)),
        None => None,
    };
    let snapshot = match &args.page_snapshot {
        Some(path) => {
            let json = read_input(path).await?;
            Some(
                PageSnapshot::from_json(&json)
                    .with_context(|| format!("invalid page snapshot {}", path.display()))?,
            )
        }
        None => None,
    };

    let source = LinkSource::from_parts(
        snapshot.as_ref().map(|page| page as &dyn RenderedPage),
        document.as_ref().map(|doc| doc as &dyn ParsedDocument),
    )?;

    let queue = MemoryRequestQueue::new();
    let outcomes = enqueue_links(source, &queue, &options).await?;

    // Look up what was actually stored so we can show URL and method
    let mut stored: HashMap<String, RequestDescriptor> = HashMap::new();
    while let Some(next) = queue.fetch_next_request().await {
        stored.insert(next.id, next.request);
    }

    let rows: Vec<EnqueuedRequest> = outcomes
        .into_iter()
        .map(|outcome| {
            let request = stored.get(&outcome.request_id);
            EnqueuedRequest {
                url: request.map(|r| r.url.clone()).unwrap_or_else(|| outcome.unique_key.clone()),
                method: request.map(|r| r.method.to_string()).unwrap_or_default(),
                user_data: request.map(|r| r.user_data.clone()).unwrap_or_default(),
                outcome,
            }
        })
        .collect();

    print_results(&rows, args.json)?;
    Ok(0)
}

// Combines the config file (if any) with command-line flags.
//
// Scalars from flags replace the file's values; pattern lists are extended.
fn build_options(args: &EnqueueArgs) -> Result<EnqueueOptions> {
    let mut options = match &args.config {
        Some(path) => EnqueueConfig::load(path)?.into_options()?,
        None => EnqueueOptions::new(),
    };

    if let Some(selector) = &args.selector {
        options.selector = selector.clone();
    }
    if let Some(base_url) = &args.base_url {
        options.base_url = Some(base_url.clone());
    }
    if let Some(limit) = args.limit {
        options.limit = Some(limit);
    }
    options.keep_url_fragment |= args.keep_fragment;
    options.forefront |= args.forefront;

    let patterns = command_line_patterns(&args.patterns, &args.regexes)?;
    if !patterns.is_empty() {
        options = options.with_patterns(patterns);
    }
    for exclude in &args.excludes {
        options = options.with_exclude(exclude.as_str());
    }

    if let Some(label) = args.label.clone() {
        options = options.with_transform(move |mut request: RequestDescriptor| {
            request
                .user_data
                .insert("label".to_string(), Value::String(label.clone()));
            Some(request)
        });
    }

    Ok(options)
}

fn command_line_patterns(patterns: &[String], regexes: &[String]) -> Result<Vec<UrlPattern>> {
    let mut compiled: Vec<UrlPattern> = patterns.iter().map(|p| UrlPattern::parse(p)).collect();
    for source in regexes {
        let regex = Regex::new(source).with_context(|| format!("invalid --regex `{}`", source))?;
        compiled.push(UrlPattern::regex(regex));
    }
    Ok(compiled)
}

// Reads a file, or stdin when the path is "-"
async fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read stdin")?;
        return Ok(text);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

// Handles the 'match' subcommand
fn handle_match(args: MatchArgs) -> Result<i32> {
    let patterns = command_line_patterns(&args.patterns, &args.regexes)?;
    let set = PatternSet::compile(&patterns)?;

    let mut unmatched = 0;
    for url in &args.urls {
        match set.classify(url) {
            MatchOutcome::PassThrough => println!("{:<60} ✅ (no patterns, everything passes)", url),
            MatchOutcome::Matched(matcher) => println!("{:<60} ✅ {}", url, matcher.source()),
            MatchOutcome::NoMatch => {
                unmatched += 1;
                println!("{:<60} ❌ no match", url);
            }
        }
    }

    if unmatched > 0 {
        Ok(1) // Exit code 1 = some URLs would be dropped
    } else {
        Ok(0)
    }
}

// Prints the results either as a table or JSON
fn print_results(rows: &[EnqueuedRequest], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(rows)?;
        println!("{}", json_output);
    } else {
        print_table(rows);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(rows: &[EnqueuedRequest]) {
    println!("{:<60} {:<8} {:<12} {:<15}", "URL", "METHOD", "STATUS", "REQUEST ID");
    println!("{}", "=".repeat(98));

    for row in rows {
        // Truncate URL if too long for display
        let url_display = if row.url.chars().count() > 57 {
            format!("{}...", row.url.chars().take(57).collect::<String>())
        } else {
            row.url.clone()
        };

        println!(
            "{:<60} {:<8} {:<12} {:<15}",
            url_display,
            row.method,
            format_status(&row.outcome),
            row.outcome.request_id
        );
    }

    println!();

    let added = rows.iter().filter(|r| !r.outcome.was_already_present).count();

    println!("📊 Summary:");
    println!("   🆕 New: {}", added);
    println!("   🔁 Duplicate: {}", rows.len() - added);
    println!("   📋 Total: {}", rows.len());
}

fn format_status(outcome: &QueueOperationInfo) -> &'static str {
    match (outcome.was_already_present, outcome.was_already_handled) {
        (false, _) => "NEW",
        (true, false) => "DUPLICATE",
        (true, true) => "HANDLED",
    }
}
