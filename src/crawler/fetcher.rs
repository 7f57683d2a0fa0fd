//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client from configuration
//! - GET requests bounded by an optional deadline
//! - Error classification into [`FetchError`]
//!
//! There is no retry logic; a failed fetch is reported once and the
//! caller decides what to do with it.

use crate::config::FetcherConfig;
use crate::FetchError;
use reqwest::Client;
use tokio::time::{timeout_at, Instant};
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use shop_sweep::config::FetcherConfig;
/// use shop_sweep::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, giving up once `deadline` has passed
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(FetchedPage)` |
/// | any other status | `FetchError::Status` |
/// | client timeout or deadline | `FetchError::Timeout` |
/// | connection, TLS or body error | `FetchError::Network` |
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    deadline: Option<Instant>,
) -> Result<FetchedPage, FetchError> {
    match deadline {
        Some(deadline) => timeout_at(deadline, fetch(client, url))
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }),
        None => fetch(client, url).await,
    }
}

async fn fetch(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status_code: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: e,
        }
    }
}
