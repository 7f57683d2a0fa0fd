//! Configuration module for Shop-Sweep
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so running without a file
//! behaves like an empty one.
//!
//! # Example
//!
//! ```no_run
//! use shop_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shop-sweep.toml")).unwrap();
//! println!("Request timeout: {}s", config.fetcher.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, SitesConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
