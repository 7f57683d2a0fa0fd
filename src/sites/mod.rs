//! Site adapters
//!
//! Each supported shop implements [`SiteAdapter`]: how to build its search
//! URL, how to find further result pages, and how to pull listings out of a
//! results page. The crawl engine drives every adapter the same way.
//!
//! # Components
//!
//! - `BooksAdapter`: search.books.com.tw, pages enumerated from the first page
//! - `MomoAdapter`: momoshop.com.tw, no pagination discovery
//! - `PcHomeAdapter`: pchomesearch.com.tw, page-number links
//! - `YahooAdapter`: tw.search.buy.yahoo.com, links after the selected page

mod books;
mod momo;
mod pchome;
mod yahoo;

pub use books::BooksAdapter;
pub use momo::MomoAdapter;
pub use pchome::PcHomeAdapter;
pub use yahoo::YahooAdapter;

use crate::config::SitesConfig;
use crate::crawler::PageDocument;
use crate::listing::RawListing;
use crate::AdapterError;
use url::form_urlencoded;
use url::Url;

/// Names of the built-in adapters, in their default query order
pub const SITE_NAMES: &[&str] = &["books", "momo", "pchome", "yahoo"];

/// Keyword slot in a query template
pub const KEYWORD_SLOT: &str = "%s";

/// Further result pages found on the first page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    /// Pages to visit after the first one, in visiting order (may be empty)
    Pages(Vec<Url>),
    /// The adapter does not discover pagination; only the first page is read
    Unsupported,
}

impl Pagination {
    /// The discovered pages; empty for `Unsupported`
    pub fn into_pages(self) -> Vec<Url> {
        match self {
            Self::Pages(pages) => pages,
            Self::Unsupported => Vec::new(),
        }
    }
}

/// Site-specific query construction, pagination discovery and extraction
pub trait SiteAdapter: Send + Sync {
    /// Short site name used in logs, output and configuration
    fn name(&self) -> &str;

    /// Search URL template with a single `%s` keyword slot
    fn query_template(&self) -> &str;

    /// Builds the first results page URL for `keyword`
    ///
    /// The keyword is form-encoded before substitution.
    fn build_query_url(&self, keyword: &str) -> Result<Url, AdapterError> {
        let filled = fill_template(self.query_template(), keyword)?;
        Url::parse(&filled)
            .map_err(|e| AdapterError::InvalidTemplate(format!("{}: {}", filled, e)))
    }

    /// Finds the remaining result pages, given the first page only
    fn discover_pages(&self, doc: &PageDocument) -> Result<Pagination, AdapterError>;

    /// Extracts listings from any results page, in page order
    ///
    /// A field that cannot be found is left as `None`; the item is kept.
    fn extract_listings(&self, doc: &PageDocument) -> Result<Vec<RawListing>, AdapterError>;
}

/// Substitutes the form-encoded keyword into a query template
///
/// # Example
///
/// ```
/// use shop_sweep::sites::fill_template;
///
/// let url = fill_template("http://x.test/search?q=%s", "running shoes").unwrap();
/// assert_eq!(url, "http://x.test/search?q=running+shoes");
/// ```
pub fn fill_template(template: &str, keyword: &str) -> Result<String, AdapterError> {
    let slots = template.matches(KEYWORD_SLOT).count();
    if slots != 1 {
        return Err(AdapterError::InvalidTemplate(format!(
            "'{}' must contain exactly one '{}', found {}",
            template, KEYWORD_SLOT, slots
        )));
    }

    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(AdapterError::EmptyKeyword);
    }

    Ok(template.replace(KEYWORD_SLOT, &encode_keyword(keyword)))
}

/// Form-encodes a keyword (spaces become `+`)
pub fn encode_keyword(keyword: &str) -> String {
    form_urlencoded::byte_serialize(keyword.as_bytes()).collect()
}

/// Collects absolute hrefs of every anchor matching `css`, in document order
///
/// `keep` filters anchors before their href is resolved.
pub(crate) fn collect_page_links<F>(
    doc: &PageDocument,
    css: &str,
    keep: F,
) -> Result<Vec<Url>, AdapterError>
where
    F: Fn(&scraper::ElementRef<'_>) -> bool,
{
    Ok(doc
        .select_all(css)?
        .into_iter()
        .filter(|a| keep(a))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| doc.resolve(href))
        .collect())
}

/// The built-in adapters in their fixed default order
pub fn default_adapters() -> Vec<Box<dyn SiteAdapter>> {
    vec![
        Box::new(BooksAdapter::new()),
        Box::new(MomoAdapter::new()),
        Box::new(PcHomeAdapter::new()),
        Box::new(YahooAdapter::new()),
    ]
}

/// Looks up a built-in adapter by name, optionally overriding its template
pub fn adapter_by_name(
    name: &str,
    template: Option<&str>,
) -> Result<Box<dyn SiteAdapter>, AdapterError> {
    let adapter: Box<dyn SiteAdapter> = match (name, template) {
        ("books", None) => Box::new(BooksAdapter::new()),
        ("books", Some(t)) => Box::new(BooksAdapter::with_template(t)),
        ("momo", None) => Box::new(MomoAdapter::new()),
        ("momo", Some(t)) => Box::new(MomoAdapter::with_template(t)),
        ("pchome", None) => Box::new(PcHomeAdapter::new()),
        ("pchome", Some(t)) => Box::new(PcHomeAdapter::with_template(t)),
        ("yahoo", None) => Box::new(YahooAdapter::new()),
        ("yahoo", Some(t)) => Box::new(YahooAdapter::with_template(t)),
        (other, _) => return Err(AdapterError::UnknownSite(other.to_string())),
    };
    Ok(adapter)
}

/// Builds the enabled adapters, in configured order, with template overrides
pub fn adapters_from_config(config: &SitesConfig) -> Result<Vec<Box<dyn SiteAdapter>>, AdapterError> {
    config
        .enabled
        .iter()
        .map(|name| adapter_by_name(name, config.templates.get(name).map(String::as_str)))
        .collect()
}
