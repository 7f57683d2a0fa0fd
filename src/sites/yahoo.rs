//! Adapter for tw.search.buy.yahoo.com
//!
//! Page links after the selected entry of the pagination bar are relative
//! to the shopping search path.

use crate::crawler::{element_attr, element_text, first_match, PageDocument};
use crate::listing::RawListing;
use crate::sites::{collect_page_links, Pagination, SiteAdapter};
use crate::AdapterError;

const DEFAULT_TEMPLATE: &str = "https://tw.search.buy.yahoo.com/search/shopping/product?p=%s";

const PAGE_LINKS: &str = "div.srp_pagination li.selected ~ li > a";
const ITEM: &str = "div#srp_result_list div.item";
const TITLE_LINK: &str = "div.srp-pdtitle a";
const PRICE: &str = "div.srp-pdprice > em";

#[derive(Debug, Clone)]
pub struct YahooAdapter {
    query_template: String,
}

impl YahooAdapter {
    pub fn new() -> Self {
        Self::with_template(DEFAULT_TEMPLATE)
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            query_template: template.into(),
        }
    }
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for YahooAdapter {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn query_template(&self) -> &str {
        &self.query_template
    }

    fn discover_pages(&self, doc: &PageDocument) -> Result<Pagination, AdapterError> {
        Ok(Pagination::Pages(collect_page_links(doc, PAGE_LINKS, |_| true)?))
    }

    fn extract_listings(&self, doc: &PageDocument) -> Result<Vec<RawListing>, AdapterError> {
        let mut listings = Vec::new();

        for item in doc.select_all(ITEM)? {
            let link = first_match(item, TITLE_LINK)?;
            let name = link.and_then(|a| element_attr(a, "title").or_else(|| element_text(a)));
            let url = link
                .and_then(|a| element_attr(a, "href"))
                .and_then(|href| doc.resolve(&href))
                .map(String::from);
            let price = first_match(item, PRICE)?.and_then(element_text);

            listings.push(RawListing::new(name, url, price));
        }

        Ok(listings)
    }
}
