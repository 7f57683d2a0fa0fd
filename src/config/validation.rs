use crate::config::types::{Config, FetcherConfig, SitesConfig};
use crate::sites::{fill_template, SITE_NAMES};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_sites_config(&config.sites)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.crawl_budget_secs == Some(0) {
        return Err(ConfigError::Validation(
            "crawl_budget_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site list and template overrides
fn validate_sites_config(config: &SitesConfig) -> Result<(), ConfigError> {
    if config.enabled.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be enabled".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for name in &config.enabled {
        validate_site_name(name)?;
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "site '{}' is enabled more than once",
                name
            )));
        }
    }

    for (name, template) in &config.templates {
        validate_site_name(name)?;
        validate_template(name, template)?;
    }

    Ok(())
}

fn validate_site_name(name: &str) -> Result<(), ConfigError> {
    if !SITE_NAMES.contains(&name) {
        return Err(ConfigError::Validation(format!(
            "unknown site '{}', expected one of: {}",
            name,
            SITE_NAMES.join(", ")
        )));
    }
    Ok(())
}

/// Checks that a template has a single keyword slot and yields an http(s) URL
fn validate_template(name: &str, template: &str) -> Result<(), ConfigError> {
    let filled = fill_template(template, "probe").map_err(|e| {
        ConfigError::Validation(format!("template for '{}': {}", name, e))
    })?;

    let url = Url::parse(&filled).map_err(|e| {
        ConfigError::InvalidUrl(format!("template for '{}' ('{}'): {}", name, template, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "template for '{}' must use http or https, got '{}'",
            name,
            url.scheme()
        )));
    }

    Ok(())
}
