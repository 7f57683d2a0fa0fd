//! Crawler module for fetching and processing result pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching bounded by an optional deadline
//! - HTML parsing into queryable page documents
//! - The per-site crawl loop

mod document;
mod engine;
mod fetcher;

pub use document::{element_attr, element_text, first_match, parse_selector, PageDocument};
pub use engine::{CrawlEngine, CrawlOutcome, PageFailure};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
