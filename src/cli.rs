//! CLI parsing and orchestration. Parses args, runs the crawl, writes JSON. Maps errors to exit codes.

use crate::config::{self, Config};
use crate::crawl::{CrawlEvent, CrawlOptions, Crawler};
use crate::output::{write_json, OutputError};
use crate::rate_limit::RateLimiter;
use crate::scraper::{is_column_key, ArchiveClient, ScraperError, SiteRoot, COLUMN_KEYS};
use clap::Parser;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OUTPUT: &str = "aozora.json";

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Output(#[from] OutputError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Output(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "aozorascrape")]
#[command(about = "Crawl Aozora Bunko author and book pages and write their metadata as JSON")]
#[command(
    after_help = "Config file keys (output, waiting_time_secs, columns, base_url, user_agent, timeout_secs, encoding) are read from ./aozorascrape.toml or the user config directory. CLI flags override config."
)]
pub struct Args {
    /// Output JSON path. Default: ./aozora.json
    #[arg(short = 'o', long = "output", alias = "object")]
    pub output: Option<PathBuf>,

    /// Minimum seconds between book page fetches (default 0.1).
    #[arg(short = 'w', long = "waiting-time", value_parser = parse_waiting_time)]
    pub waiting_time: Option<RateLimiter>,

    /// Comma-separated column keys to crawl, in order (a, ka, sa, ta, na, ha, ma, ya, ra, wa). Default: all.
    #[arg(long, value_delimiter = ',', value_parser = parse_column_key)]
    pub columns: Vec<String>,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and the full error chain on failure.
    #[arg(long)]
    pub verbose: bool,
}

fn parse_waiting_time(s: &str) -> Result<RateLimiter, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --waiting-time: '{}' is not a number", s))?;
    RateLimiter::from_secs_f64(secs).map_err(|e| format!("Invalid --waiting-time: {}", e))
}

fn parse_column_key(s: &str) -> Result<String, String> {
    let key = s.trim().to_lowercase();
    validate_columns(std::slice::from_ref(&key))?;
    Ok(key)
}

fn validate_columns(keys: &[String]) -> Result<(), String> {
    if keys.is_empty() {
        return Err("Invalid columns: no column keys given".to_string());
    }
    if let Some(bad) = keys.iter().find(|k| !is_column_key(k.as_str())) {
        return Err(format!(
            "Invalid column '{}'. Use one of: {}.",
            bad,
            COLUMN_KEYS.join(", ")
        ));
    }
    Ok(())
}

/// Ensure output path parent exists.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Merge CLI flags over config over defaults.
fn crawl_options(args: &Args, config: Option<&Config>) -> Result<CrawlOptions, CliRunError> {
    let rate_limiter = match args.waiting_time {
        Some(limiter) => limiter,
        None => match config.and_then(|c| c.waiting_time_secs) {
            Some(secs) => RateLimiter::from_secs_f64(secs)
                .map_err(|e| CliRunError::InvalidInput(format!("Invalid config: {}", e)))?,
            None => RateLimiter::default(),
        },
    };

    let columns = match args.columns.as_slice() {
        [] => match config.and_then(|c| c.columns.clone()) {
            Some(columns) => {
                validate_columns(&columns).map_err(CliRunError::InvalidInput)?;
                columns
            }
            None => COLUMN_KEYS.iter().map(|k| k.to_string()).collect(),
        },
        given => given.to_vec(),
    };

    let root = match config.and_then(|c| c.base_url.as_deref()) {
        Some(url) => SiteRoot::parse(url).map_err(|e| {
            CliRunError::InvalidInput(format!("Invalid base_url in config: {}", e))
        })?,
        None => SiteRoot::default(),
    };

    Ok(CrawlOptions {
        columns,
        root,
        rate_limiter,
        ..CrawlOptions::default()
    })
}

fn build_client(config: Option<&Config>) -> Result<ArchiveClient, CliRunError> {
    let mut builder = ArchiveClient::builder();
    if let Some(ua) = config.and_then(|c| c.user_agent.clone()) {
        builder = builder.user_agent(ua);
    }
    if let Some(secs) = config.and_then(|c| c.timeout_secs) {
        builder = builder.timeout_secs(secs);
    }
    if let Some(label) = config.and_then(|c| c.encoding.clone()) {
        builder = builder.encoding(label);
    }
    builder.build().map_err(|e| match e {
        ScraperError::UnknownEncoding { .. } => {
            CliRunError::InvalidInput(format!("Invalid config: {}", e))
        }
        other => CliRunError::Scraper(other),
    })
}

/// One progress line per author and per book, in the order they are crawled.
fn progress_line(event: &CrawlEvent<'_>) -> Option<String> {
    match event {
        CrawlEvent::Column { .. } => None,
        CrawlEvent::Author { name, .. } => Some(name.to_string()),
        CrawlEvent::Book { record, .. } => Some(format!(
            "  {} {} {}",
            record.title, record.subtitle, record.kana_usage
        )),
    }
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let config = config.as_ref();

    let output_path = args
        .output
        .clone()
        .or_else(|| config.and_then(|c| c.output.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    validate_output_path(&output_path)?;

    let options = crawl_options(args, config)?;
    let mut client = build_client(config)?;

    tracing::info!(
        columns = ?options.columns,
        root = options.root.as_str(),
        interval = ?options.rate_limiter.min_interval(),
        output = %output_path.display(),
        "starting crawl"
    );

    let column_bar: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |event: &CrawlEvent<'_>| {
        if let CrawlEvent::Column {
            key,
            position,
            total,
        } = event
        {
            let mut state = column_bar.borrow_mut();
            let bar = state.get_or_insert_with(|| {
                let bar = indicatif::ProgressBar::new(*total as u64);
                if let Ok(style) = indicatif::ProgressStyle::default_bar()
                    .template("{spinner} {msg} [{bar:30}] {pos}/{len} ({elapsed})")
                {
                    bar.set_style(
                        style
                            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                            .progress_chars("█▉▊▋▌▍▎▏ "),
                    );
                }
                bar.enable_steady_tick(Duration::from_millis(80));
                bar
            });
            bar.set_position(position.saturating_sub(1) as u64);
            bar.set_message(format!("Column {}", key));
            return;
        }
        if let Some(line) = progress_line(event) {
            match column_bar.borrow().as_ref() {
                Some(bar) => bar.println(line),
                None => println!("{}", line),
            }
        }
    };
    let progress: Option<&dyn Fn(&CrawlEvent<'_>)> =
        if args.quiet { None } else { Some(&progress_cb) };

    let result = Crawler::new(&mut client, options).crawl(progress)?;

    if let Some(bar) = column_bar.borrow_mut().take() {
        bar.disable_steady_tick();
        bar.finish_and_clear();
    }

    write_json(&result, &output_path)?;

    let books: usize = result.values().map(Vec::len).sum();
    tracing::info!(authors = result.len(), books, "crawl finished");
    if !args.quiet {
        eprintln!(
            "Wrote {} ({} authors, {} books)",
            output_path.display(),
            result.len(),
            books
        );
    }
    Ok(())
}
