//! Shop-Sweep: a multi-source product listing scraper
//!
//! This crate queries several e-commerce sites for a keyword, follows each
//! site's pagination and extracts normalized product listings.

pub mod config;
pub mod crawler;
pub mod listing;
pub mod runner;
pub mod sites;

use thiserror::Error;

/// Main error type for Shop-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Errors raised while fetching a single page
///
/// None of these abort a crawl: the page simply contributes no listings.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Network { url, .. } | Self::Timeout { url } => url,
        }
    }
}

/// Site adapter errors
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Search keyword must not be empty")]
    EmptyKeyword,

    #[error("Invalid query template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Unknown site: {0}")]
    UnknownSite(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlOutcome, PageDocument};
pub use listing::{Listing, RawListing};
pub use runner::{RunSummary, Runner};
pub use sites::{default_adapters, Pagination, SiteAdapter};
