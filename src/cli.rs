//! CLI parsing and orchestration. Builds the client from flags and config, runs one source
//! operation, prints entities as JSON. Maps errors to exit codes.

use crate::config;
use crate::model::PageImage;
use crate::source::{GoldenMangas, PoliteClient, Source, SourceError, BASE_URL};
use clap::{Parser, Subcommand};
use reqwest::Url;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Output(String),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Source(_) => 2,
            CliRunError::Output(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "goldenmangas")]
#[command(about = "Browse Golden Mangás listings, details, chapters, and page images")]
#[command(
    after_help = "Config file keys (base_url, user_agent, request_interval_secs, timeout_secs, connect_timeout_secs) are read from ./goldenmangas.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Site root (overrides config; default https://goldenmanga.top).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// HTTP User-Agent (overrides config).
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Minimum seconds between requests (overrides config; default 3).
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Request timeout in seconds (overrides config; default 60).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Debug logging and the full error chain.
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Most read titles on the home page.
    Popular,
    /// Latest updates.
    Latest {
        /// 1-based page number.
        #[arg(long, default_value_t = 1, value_parser = parse_page)]
        page: u32,
    },
    /// Search titles by name.
    Search { query: String },
    /// Full metadata for a title URL (site path or absolute).
    Details { url: String },
    /// Chapter list for a title URL.
    Chapters { url: String },
    /// Page images of a chapter URL.
    Pages { url: String },
    /// Download one page image.
    Image {
        /// Chapter document the image belongs to (sent as Referer).
        page_url: String,
        image_url: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_page(s: &str) -> Result<u32, String> {
    let page: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --page: '{}' is not a page number", s))?;
    if page == 0 {
        return Err("Invalid --page: pages start at 1".to_string());
    }
    Ok(page)
}

fn parse_base_url(s: &str) -> Result<Url, CliRunError> {
    let url = Url::parse(s.trim())
        .map_err(|e| CliRunError::InvalidInput(format!("Invalid base URL '{}': {}", s, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CliRunError::InvalidInput(format!(
            "Invalid base URL '{}': expected http or https",
            s
        )));
    }
    Ok(url)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliRunError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliRunError::Output(format!("Failed to write JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn write_image(path: &Path, bytes: &[u8]) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    std::fs::write(path, bytes)
        .map_err(|e| CliRunError::Output(format!("Cannot write {}: {}", path.display(), e)))
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;

    const DEFAULT_INTERVAL_SECS: u64 = 3;
    const DEFAULT_TIMEOUT_SECS: u64 = 60;
    let base_url = args
        .base_url
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.base_url.clone()))
        .unwrap_or_else(|| BASE_URL.to_string());
    let base_url = parse_base_url(&base_url)?;
    let interval_secs = args
        .interval
        .or_else(|| config.as_ref().and_then(|c| c.request_interval_secs))
        .unwrap_or(DEFAULT_INTERVAL_SECS);
    let timeout_secs = args
        .timeout
        .or_else(|| config.as_ref().and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let connect_timeout_secs = config
        .as_ref()
        .and_then(|c| c.connect_timeout_secs)
        .unwrap_or(timeout_secs);
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.user_agent.clone()));

    let mut builder = PoliteClient::builder()
        .interval_secs(interval_secs)
        .timeout_secs(timeout_secs)
        .connect_timeout_secs(connect_timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let mut client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;
    let mut source = GoldenMangas::with_base_url(&mut client, base_url);
    tracing::debug!(source = source.name(), base_url = %source.base_url(), "running");

    match &args.command {
        Command::Popular => print_json(&source.popular()?),
        Command::Latest { page } => print_json(&source.latest(*page)?),
        Command::Search { query } => print_json(&source.search(query)?),
        Command::Details { url } => print_json(&source.details(url)?),
        Command::Chapters { url } => print_json(&source.chapters(url)?),
        Command::Pages { url } => print_json(&source.pages(url)?),
        Command::Image {
            page_url,
            image_url,
            output,
        } => {
            let page = PageImage {
                index: 0,
                document_url: page_url.clone(),
                image_url: image_url.clone(),
            };
            let bytes = source.image(&page)?;
            write_image(output, &bytes)?;
            eprintln!("Wrote {} ({} bytes)", output.display(), bytes.len());
            Ok(())
        }
    }
}
