//! Multi-site runner
//!
//! Runs the crawl engine over a fixed, ordered list of adapters for one
//! keyword. Sites are queried one after another; a site that fails is
//! recorded and the rest still run.

use crate::crawler::CrawlEngine;
use crate::listing::Listing;
use crate::sites::SiteAdapter;

/// Per-site result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    /// Adapter name
    pub source: String,
    /// Listings emitted for this site
    pub listings: usize,
    /// Pages fetched successfully
    pub pages_fetched: usize,
    /// Pages that contributed nothing because they failed
    pub failed_pages: usize,
    /// Set when the crawl could not start at all
    pub error: Option<String>,
}

/// Result of running every adapter once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub per_source: Vec<SourceSummary>,
}

impl RunSummary {
    pub fn total_listings(&self) -> usize {
        self.per_source.iter().map(|s| s.listings).sum()
    }

    /// Sites whose crawl returned an error
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceSummary> {
        self.per_source.iter().filter(|s| s.error.is_some())
    }
}

/// Drives a crawl per adapter and hands every listing to a sink
pub struct Runner {
    engine: CrawlEngine,
    adapters: Vec<Box<dyn SiteAdapter>>,
}

impl Runner {
    pub fn new(engine: CrawlEngine, adapters: Vec<Box<dyn SiteAdapter>>) -> Self {
        Self { engine, adapters }
    }

    pub fn adapters(&self) -> &[Box<dyn SiteAdapter>] {
        &self.adapters
    }

    /// Queries every adapter in order, calling `sink(source, listing)` for
    /// each listing as soon as its site finishes
    pub async fn run<F>(&self, keyword: &str, mut sink: F) -> RunSummary
    where
        F: FnMut(&str, &Listing),
    {
        let mut summary = RunSummary::default();

        for adapter in &self.adapters {
            let source = adapter.name();
            tracing::info!("Querying {}", source);

            let entry = match self.engine.crawl(adapter.as_ref(), keyword).await {
                Ok(outcome) => {
                    for listing in &outcome.listings {
                        sink(source, listing);
                    }
                    tracing::info!(
                        "Found {} listings from {}",
                        outcome.listings.len(),
                        source
                    );
                    SourceSummary {
                        source: source.to_string(),
                        listings: outcome.listings.len(),
                        pages_fetched: outcome.pages_fetched,
                        failed_pages: outcome.failures.len(),
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to query {}: {}", source, e);
                    SourceSummary {
                        source: source.to_string(),
                        listings: 0,
                        pages_fetched: 0,
                        failed_pages: 0,
                        error: Some(e.to_string()),
                    }
                }
            };

            summary.per_source.push(entry);
        }

        summary
    }
}
