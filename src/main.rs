//! Shop-Sweep main entry point
//!
//! This is the command-line interface for the Shop-Sweep listing scraper.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use shop_sweep::config::{load_config_with_hash, Config};
use shop_sweep::crawler::CrawlEngine;
use shop_sweep::runner::Runner;
use shop_sweep::sites::{adapters_from_config, SITE_NAMES};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shop-Sweep: search several shops for a keyword
///
/// Each enabled site is queried in turn, its result pages are followed and
/// every listing is printed as `name price url`.
#[derive(Parser, Debug)]
#[command(name = "shop-sweep")]
#[command(version)]
#[command(about = "Search several shops for a keyword", long_about = None)]
struct Cli {
    /// Search keyword
    #[arg(value_name = "QUERY")]
    query: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only query these sites (repeatable)
    #[arg(short, long = "site", value_name = "NAME")]
    sites: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.query.trim().is_empty() {
        Cli::command()
            .error(ErrorKind::ValueValidation, "QUERY must not be empty")
            .exit();
    }

    for site in &cli.sites {
        if !SITE_NAMES.contains(&site.as_str()) {
            Cli::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!(
                        "unknown site '{}', expected one of: {}",
                        site,
                        SITE_NAMES.join(", ")
                    ),
                )
                .exit();
        }
    }

    let verbose = if cli.debug { cli.verbose.max(1) } else { cli.verbose };
    setup_logging(verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if !cli.sites.is_empty() {
        config.sites.enabled = cli.sites.clone();
    }

    let adapters = adapters_from_config(&config.sites)?;
    let engine = CrawlEngine::from_config(&config.fetcher)?;
    let runner = Runner::new(engine, adapters);

    tracing::info!(
        "Searching {} sites for '{}'",
        runner.adapters().len(),
        cli.query
    );

    let summary = runner
        .run(&cli.query, |_source, listing| println!("{}", listing))
        .await;

    for source in &summary.per_source {
        tracing::info!(
            "{}: {} listings, {} pages, {} failed pages",
            source.source,
            source.listings,
            source.pages_fetched,
            source.failed_pages
        );
    }
    tracing::info!("Total listings: {}", summary.total_listings());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only listings.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shop_sweep=info,warn"),
            1 => EnvFilter::new("shop_sweep=debug,info"),
            2 => EnvFilter::new("shop_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
