//! Adapter for momoshop.com.tw
//!
//! Pagination on this site is driven by scripts, so only the first results
//! page is read.

use crate::crawler::{element_attr, element_text, first_match, PageDocument};
use crate::listing::RawListing;
use crate::sites::{Pagination, SiteAdapter};
use crate::AdapterError;
use scraper::ElementRef;

const DEFAULT_TEMPLATE: &str = "http://www.momoshop.com.tw/mosearch/%s.html";

const ITEM: &str = "div#searchResults ul#chessboard li";
const NAME: &str = "span#goods_name a";
const PRICE: &str = "span.money";

#[derive(Debug, Clone)]
pub struct MomoAdapter {
    query_template: String,
}

impl MomoAdapter {
    pub fn new() -> Self {
        Self::with_template(DEFAULT_TEMPLATE)
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            query_template: template.into(),
        }
    }
}

impl Default for MomoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// The product link is the item's direct `<a>` child
fn direct_link(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
    item.children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "a")
}

impl SiteAdapter for MomoAdapter {
    fn name(&self) -> &str {
        "momo"
    }

    fn query_template(&self) -> &str {
        &self.query_template
    }

    fn discover_pages(&self, _doc: &PageDocument) -> Result<Pagination, AdapterError> {
        Ok(Pagination::Unsupported)
    }

    fn extract_listings(&self, doc: &PageDocument) -> Result<Vec<RawListing>, AdapterError> {
        let mut listings = Vec::new();

        for item in doc.select_all(ITEM)? {
            let name = first_match(item, NAME)?.and_then(element_text);
            let url = direct_link(item)
                .and_then(|a| element_attr(a, "href"))
                .and_then(|href| doc.resolve(&href))
                .map(String::from);
            let price = first_match(item, PRICE)?.and_then(element_text);

            listings.push(RawListing::new(name, url, price));
        }

        Ok(listings)
    }
}
