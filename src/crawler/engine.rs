//! Crawl engine - per-site crawl orchestration
//!
//! This module contains the crawl loop that drives one [`SiteAdapter`] for
//! one keyword:
//! - Building and fetching the first results page
//! - Discovering the remaining pages from the first page only
//! - Draining the pending pages in discovery order
//! - Extracting listings from every page that loaded
//!
//! Fetch and extraction failures are recorded per page and never abort the
//! crawl. Exactly one fetch is in flight at a time.

use crate::config::FetcherConfig;
use crate::crawler::document::PageDocument;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::listing::Listing;
use crate::sites::{Pagination, SiteAdapter};
use crate::SweepError;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// A page that contributed no listings, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// The page URL
    pub url: String,
    /// Human-readable cause
    pub reason: String,
}

/// Everything one crawl produced
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Listings in page visitation order, then extraction order
    pub listings: Vec<Listing>,
    /// Pages that were fetched successfully
    pub pages_fetched: usize,
    /// Pages (or discovery steps) that failed
    pub failures: Vec<PageFailure>,
}

/// Per-crawl state, created fresh for every crawl
#[derive(Default)]
struct CrawlState {
    pending: VecDeque<Url>,
    visited: HashSet<String>,
    outcome: CrawlOutcome,
}

impl CrawlState {
    fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    fn enqueue(&mut self, pages: Vec<Url>) {
        self.pending.extend(pages);
    }

    /// Pops the earliest discovered page that has not been fetched yet
    fn next_page(&mut self) -> Option<Url> {
        while let Some(url) = self.pending.pop_front() {
            if self.mark_visited(&url) {
                return Some(url);
            }
            tracing::debug!("Skipping already visited page {}", url);
        }
        None
    }

    fn record_failure(&mut self, url: &str, reason: impl ToString) {
        self.outcome.failures.push(PageFailure {
            url: url.to_string(),
            reason: reason.to_string(),
        });
    }
}

/// Drives site adapters through fetch, discovery and extraction
#[derive(Debug, Clone)]
pub struct CrawlEngine {
    client: Client,
    crawl_budget: Option<Duration>,
}

impl CrawlEngine {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            crawl_budget: None,
        }
    }

    /// Builds an engine with its own HTTP client from fetcher settings
    pub fn from_config(config: &FetcherConfig) -> Result<Self, SweepError> {
        let engine = Self::new(build_http_client(config)?);
        Ok(match config.crawl_budget() {
            Some(budget) => engine.with_crawl_budget(budget),
            None => engine,
        })
    }

    /// Limits every crawl started by [`crawl`](Self::crawl) to `budget`
    pub fn with_crawl_budget(mut self, budget: Duration) -> Self {
        self.crawl_budget = Some(budget);
        self
    }

    /// Crawls `adapter` for `keyword` and returns the listings only
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shop_sweep::config::FetcherConfig;
    /// use shop_sweep::crawler::CrawlEngine;
    /// use shop_sweep::sites::MomoAdapter;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let engine = CrawlEngine::from_config(&FetcherConfig::default())?;
    /// let listings = engine.query(&MomoAdapter::new(), "shoes").await?;
    /// for listing in listings {
    ///     println!("{}", listing);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn query(
        &self,
        adapter: &dyn SiteAdapter,
        keyword: &str,
    ) -> Result<Vec<Listing>, SweepError> {
        Ok(self.crawl(adapter, keyword).await?.listings)
    }

    /// Crawls `adapter` for `keyword` within the configured budget
    pub async fn crawl(
        &self,
        adapter: &dyn SiteAdapter,
        keyword: &str,
    ) -> Result<CrawlOutcome, SweepError> {
        let deadline = self.crawl_budget.map(|budget| Instant::now() + budget);
        self.crawl_until(adapter, keyword, deadline).await
    }

    /// Crawls `adapter` for `keyword`, forwarding `deadline` to every fetch
    ///
    /// # Crawl Flow
    ///
    /// 1. Build the query URL; an invalid keyword or template is an error
    /// 2. Fetch it; on failure the crawl ends with no listings
    /// 3. Discover further pages from this first page only
    /// 4. Extract listings from the first page
    /// 5. Fetch each discovered page in order and extract its listings,
    ///    recording failed pages and moving on
    pub async fn crawl_until(
        &self,
        adapter: &dyn SiteAdapter,
        keyword: &str,
        deadline: Option<Instant>,
    ) -> Result<CrawlOutcome, SweepError> {
        let site = adapter.name();
        let start_url = adapter.build_query_url(keyword)?;
        tracing::info!("[{}] Starting crawl at {}", site, start_url);

        let mut state = CrawlState::default();
        state.mark_visited(&start_url);

        let first = match fetch_page(&self.client, &start_url, deadline).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("[{}] First page failed, no results: {}", site, e);
                state.record_failure(start_url.as_str(), e);
                return Ok(state.outcome);
            }
        };
        state.outcome.pages_fetched += 1;
        state.mark_visited(&first.final_url);

        {
            let doc = PageDocument::parse(&first.body, first.final_url);

            match adapter.discover_pages(&doc) {
                Ok(Pagination::Pages(pages)) => {
                    tracing::debug!("[{}] Discovered {} more pages", site, pages.len());
                    state.enqueue(pages);
                }
                Ok(Pagination::Unsupported) => {
                    tracing::debug!("[{}] Pagination not supported, first page only", site);
                }
                Err(e) => {
                    tracing::warn!("[{}] Page discovery failed on {}: {}", site, start_url, e);
                    state.record_failure(start_url.as_str(), e);
                }
            }

            extract_page(adapter, &doc, &start_url, &mut state);
        }

        while let Some(url) = state.next_page() {
            tracing::debug!("[{}] Fetching page {}", site, url);

            match fetch_page(&self.client, &url, deadline).await {
                Ok(page) => {
                    state.outcome.pages_fetched += 1;
                    state.mark_visited(&page.final_url);
                    let doc = PageDocument::parse(&page.body, page.final_url);
                    extract_page(adapter, &doc, &url, &mut state);
                }
                Err(e) => {
                    tracing::warn!("[{}] Error loading page: {}", site, e);
                    state.record_failure(url.as_str(), e);
                }
            }
        }

        tracing::info!(
            "[{}] Crawl finished: {} listings from {} pages, {} failures",
            site,
            state.outcome.listings.len(),
            state.outcome.pages_fetched,
            state.outcome.failures.len()
        );

        Ok(state.outcome)
    }
}

/// Extracts one page's listings into the crawl state
fn extract_page(adapter: &dyn SiteAdapter, doc: &PageDocument, url: &Url, state: &mut CrawlState) {
    match adapter.extract_listings(doc) {
        Ok(raw) => {
            tracing::debug!("[{}] {} listings on {}", adapter.name(), raw.len(), url);
            state
                .outcome
                .listings
                .extend(raw.into_iter().map(Listing::from_raw));
        }
        Err(e) => {
            tracing::warn!("[{}] Extraction failed on {}: {}", adapter.name(), url, e);
            state.record_failure(url.as_str(), e);
        }
    }
}
