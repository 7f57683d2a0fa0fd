//! Adapter for pchomesearch.com.tw

use crate::crawler::{element_text, first_match, PageDocument};
use crate::listing::RawListing;
use crate::sites::{collect_page_links, Pagination, SiteAdapter};
use crate::AdapterError;

const DEFAULT_TEMPLATE: &str = "http://www.pchomesearch.com.tw/index.php?q=%s";

const PAGE_LINKS: &str = "div.search_foot_content div.page_number a";
const ITEM: &str = "div.list_content_table ul";
const NAME: &str = "li.list_td_item_pdname138";
// The product URL is printed as text in its own cell
const URL_CELL: &str = "li.list_td_item_name138_link";
const PRICE: &str = "span.list_td_item_name138_dolors";

#[derive(Debug, Clone)]
pub struct PcHomeAdapter {
    query_template: String,
}

impl PcHomeAdapter {
    pub fn new() -> Self {
        Self::with_template(DEFAULT_TEMPLATE)
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            query_template: template.into(),
        }
    }
}

impl Default for PcHomeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for PcHomeAdapter {
    fn name(&self) -> &str {
        "pchome"
    }

    fn query_template(&self) -> &str {
        &self.query_template
    }

    fn discover_pages(&self, doc: &PageDocument) -> Result<Pagination, AdapterError> {
        Ok(Pagination::Pages(collect_page_links(doc, PAGE_LINKS, |_| true)?))
    }

    fn extract_listings(&self, doc: &PageDocument) -> Result<Vec<RawListing>, AdapterError> {
        let mut listings = Vec::new();

        for row in doc.select_all(ITEM)? {
            listings.push(RawListing::new(
                first_match(row, NAME)?.and_then(element_text),
                first_match(row, URL_CELL)?.and_then(element_text),
                first_match(row, PRICE)?.and_then(element_text),
            ));
        }

        Ok(listings)
    }
}
