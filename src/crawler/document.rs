//! Parsed result pages
//!
//! A [`PageDocument`] wraps the `scraper` tree for one fetched page together
//! with the URL it came from, so adapters can run selectors and turn
//! relative links into absolute ones.

use crate::AdapterError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parsed, queryable representation of one HTML page
pub struct PageDocument {
    html: Html,
    base_url: Url,
}

impl PageDocument {
    /// Parses an HTML body fetched from `base_url`
    ///
    /// # Example
    ///
    /// ```
    /// use shop_sweep::crawler::PageDocument;
    /// use url::Url;
    ///
    /// let html = r#"<html><body><a href="/page2">2</a></body></html>"#;
    /// let doc = PageDocument::parse(html, Url::parse("https://example.com/search").unwrap());
    /// assert_eq!(doc.base_url().as_str(), "https://example.com/search");
    /// ```
    pub fn parse(body: &str, base_url: Url) -> Self {
        Self {
            html: Html::parse_document(body),
            base_url,
        }
    }

    /// The URL this page was fetched from
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// All elements matching a CSS selector, in document order
    pub fn select_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>, AdapterError> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Resolves an href against the page URL
    ///
    /// Returns None if the link should be excluded:
    /// - javascript:, mailto:, tel:, data: schemes
    /// - fragment-only links
    /// - invalid URLs
    /// - non-HTTP(S) URLs after resolution
    pub fn resolve(&self, href: &str) -> Option<Url> {
        resolve_link(href, &self.base_url)
    }
}

/// Parses a CSS selector, mapping failures into [`AdapterError`]
pub fn parse_selector(css: &str) -> Result<Selector, AdapterError> {
    Selector::parse(css).map_err(|e| AdapterError::InvalidSelector(format!("{}: {:?}", css, e)))
}

/// First element under `scope` matching `css`
pub fn first_match<'a>(
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, AdapterError> {
    let selector = parse_selector(css)?;
    Ok(scope.select(&selector).next())
}

/// Concatenated, trimmed text of an element; None when empty
pub fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Trimmed attribute value; None when absent or empty
pub fn element_attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
