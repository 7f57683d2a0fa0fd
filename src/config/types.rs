use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for Shop-Sweep
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub sites: SitesConfig,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total timeout for a single request (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout for a single request (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Time budget for one site's whole crawl (seconds)
    #[serde(rename = "crawl-budget-secs")]
    pub crawl_budget_secs: Option<u64>,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn crawl_budget(&self) -> Option<Duration> {
        self.crawl_budget_secs.map(Duration::from_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("shop-sweep/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            crawl_budget_secs: None,
        }
    }
}

/// Which sites to query and how to reach them
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitesConfig {
    /// Site names, queried in this order
    pub enabled: Vec<String>,

    /// Query template overrides keyed by site name; `%s` marks the keyword
    pub templates: BTreeMap<String, String>,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            enabled: crate::sites::SITE_NAMES
                .iter()
                .map(ToString::to_string)
                .collect(),
            templates: BTreeMap::new(),
        }
    }
}
