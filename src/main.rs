//! Host-Crawl main entry point
//!
//! This is the command-line interface for the Host-Crawl single-host crawler.

use anyhow::Context;
use clap::Parser;
use host_crawl::config::{compute_config_hash, read_config, validate, Config};
use host_crawl::crawler::crawl;
use host_crawl::output::print_statistics;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Host-Crawl: crawl one host and save every page it links to
///
/// Starting from the seed address, Host-Crawl follows links that stay on the
/// seed's host and writes each page below the output directory. At least one
/// of --timeout and --pages must be given.
#[derive(Parser, Debug)]
#[command(name = "host-crawl")]
#[command(version)]
#[command(about = "Crawl a host and save its pages locally", long_about = None)]
struct Cli {
    /// The address to start from, e.g. https://www.example.com
    #[arg(long, value_name = "URL")]
    host: Option<String>,

    /// Lifetime of the crawl in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Number of pages to save before stopping
    #[arg(long, value_name = "N")]
    pages: Option<u64>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Directory saved pages are written below
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Path to a TOML configuration file; flags override its values
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show what would be crawled
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line flags on top of a file configuration
    fn merge_into(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.crawl.host = host.clone();
        }
        if let Some(timeout) = self.timeout {
            config.crawl.timeout_secs = Some(timeout);
        }
        if let Some(pages) = self.pages {
            config.crawl.page_limit = Some(pages);
        }
        if let Some(workers) = self.workers {
            config.crawl.workers = workers;
        }
        if let Some(output_dir) = &self.output_dir {
            config.output.output_dir = output_dir.clone();
        }
        if let Some(log_file) = &self.log_file {
            config.output.log_file = Some(log_file.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    cli.merge_into(&mut config);

    setup_logging(cli.verbose, cli.quiet, config.output.log_file.as_deref())?;

    let session = session_id();
    tracing::info!("---------- START {} ----------", session);

    if let Some(path) = &cli.config {
        let hash = compute_config_hash(path)?;
        tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash);
    }

    if let Err(e) = validate(&config) {
        tracing::error!("Invalid flags: {}", e);
        return Err(e).context("Invalid configuration");
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let report = match crawl(&config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        print_statistics(&report);
    }

    tracing::info!("---------- END {} ----------", session);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// With a log file, records are appended to it without ANSI colours.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("host_crawl=info,warn"),
            1 => EnvFilter::new("host_crawl=debug,info"),
            2 => EnvFilter::new("host_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Short identifier that tells runs apart in a shared log file
fn session_id() -> String {
    let mut hasher = Sha256::new();
    hasher.update(chrono::Utc::now().to_rfc3339().as_bytes());
    hasher.update(std::process::id().to_le_bytes());
    hex::encode(&hasher.finalize()[..10])
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Host-Crawl Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", config.crawl.host);
    match config.crawl.timeout_secs {
        Some(secs) => println!("  Timeout: {}s", secs),
        None => println!("  Timeout: none"),
    }
    match config.crawl.page_limit {
        Some(pages) => println!("  Page limit: {}", pages),
        None => println!("  Page limit: none"),
    }
    println!("  Workers: {}", config.crawl.workers);
    println!("  Request timeout: {}s", config.crawl.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", host_crawl::crawler::user_agent(&config.user_agent));

    println!("\nOutput:");
    println!("  Pages: {}", config.output.output_dir.display());
    match &config.output.log_file {
        Some(path) => println!("  Log: {}", path.display()),
        None => println!("  Log: stderr"),
    }

    println!("\n✓ Configuration is valid");
}
