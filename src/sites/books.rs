//! Adapter for search.books.com.tw
//!
//! The first results page carries a numbered page bar; every page after the
//! current one is listed there, so all pages are enumerated up front.

use crate::crawler::{element_attr, element_text, first_match, PageDocument};
use crate::listing::RawListing;
use crate::sites::{collect_page_links, Pagination, SiteAdapter};
use crate::AdapterError;

const DEFAULT_TEMPLATE: &str = "http://search.books.com.tw/exep/prod_search.php?key=%s&cat=all";

const PAGE_LINKS: &str = "div.cntlisearch10 div.page span.here ~ a";
const ITEM: &str = "li.item";
const TITLE_LINK: &str = "div.input_buy ~ h3 > a";
const PRICE: &str = "span.price b";

/// Previous/next arrows in the page bar, which duplicate numbered links
const ARROW_CLASSES: &[&str] = &["nxt", "prv"];

#[derive(Debug, Clone)]
pub struct BooksAdapter {
    query_template: String,
}

impl BooksAdapter {
    pub fn new() -> Self {
        Self::with_template(DEFAULT_TEMPLATE)
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            query_template: template.into(),
        }
    }
}

impl Default for BooksAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for BooksAdapter {
    fn name(&self) -> &str {
        "books"
    }

    fn query_template(&self) -> &str {
        &self.query_template
    }

    fn discover_pages(&self, doc: &PageDocument) -> Result<Pagination, AdapterError> {
        let pages = collect_page_links(doc, PAGE_LINKS, |a| {
            !a.value()
                .classes()
                .any(|class| ARROW_CLASSES.contains(&class))
        })?;
        Ok(Pagination::Pages(pages))
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
