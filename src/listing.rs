//! Listing records produced by a crawl

use std::fmt;

/// Placeholder for a name or URL the adapter could not find
pub const UNKNOWN: &str = "Unknown";

/// Placeholder for a price the adapter could not find
pub const UNKNOWN_PRICE: &str = "0";

/// A single product listing
///
/// The price is kept as the raw text shown by the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Listing {
    name: String,
    url: String,
    price: String,
}

impl Listing {
    pub fn new(name: impl Into<String>, url: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            price: price.into(),
        }
    }

    /// Builds a listing from extracted fields, substituting placeholders
    /// for anything the adapter did not find
    pub fn from_raw(raw: RawListing) -> Self {
        Self {
            name: raw.name.unwrap_or_else(|| UNKNOWN.to_string()),
            url: raw.url.unwrap_or_else(|| UNKNOWN.to_string()),
            price: raw.price.unwrap_or_else(|| UNKNOWN_PRICE.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn price(&self) -> &str {
        &self.price
    }
}

impl From<RawListing> for Listing {
    fn from(raw: RawListing) -> Self {
        Self::from_raw(raw)
    }
}

/// Output line format: name, price, url
impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.price, self.url)
    }
}

/// Fields extracted for one item on a results page
///
/// `None` means the field's selector matched nothing for this item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub name: Option<String>,
    pub url: Option<String>,
    pub price: Option<String>,
}

impl RawListing {
    pub fn new(name: Option<String>, url: Option<String>, price: Option<String>) -> Self {
        Self { name, url, price }
    }

    /// All three fields present
    pub fn complete(
        name: impl Into<String>,
        url: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            price: Some(price.into()),
        }
    }
}
