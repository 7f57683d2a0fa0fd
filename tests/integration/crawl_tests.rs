//! Integration tests for the crawl engine and runner
//!
//! These tests use wiremock to serve result pages and run full crawls
//! end-to-end against them.

use shop_sweep::config::FetcherConfig;
use shop_sweep::crawler::{element_attr, element_text, first_match, CrawlEngine, PageDocument};
use shop_sweep::listing::UNKNOWN_PRICE;
use shop_sweep::runner::Runner;
use shop_sweep::sites::{BooksAdapter, MomoAdapter, Pagination, SiteAdapter};
use shop_sweep::{AdapterError, Listing, RawListing};
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Generic results-page adapter used against the mock server
///
/// Pages are `<a class="page">` links, items are `<li class="item">` with
/// `span.name`, `a.link` and `span.price` children. A page containing
/// `<div id="broken">` fails extraction.
struct TestAdapter {
    template: String,
}

impl TestAdapter {
    fn new(server: &MockServer) -> Self {
        Self {
            template: format!("{}/search?q=%s", server.uri()),
        }
    }
}

impl SiteAdapter for TestAdapter {
    fn name(&self) -> &str {
        "test"
    }

    fn query_template(&self) -> &str {
        &self.template
    }

    fn discover_pages(&self, doc: &PageDocument) -> Result<Pagination, AdapterError> {
        Ok(Pagination::Pages(
            doc.select_all("a.page")?
                .into_iter()
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| doc.resolve(href))
                .collect(),
        ))
    }

    fn extract_listings(&self, doc: &PageDocument) -> Result<Vec<RawListing>, AdapterError> {
        if !doc.select_all("div#broken")?.is_empty() {
            return Err(AdapterError::InvalidSelector("div#broken".to_string()));
        }

        let mut listings = Vec::new();
        for item in doc.select_all("li.item")? {
            listings.push(RawListing::new(
                first_match(item, "span.name")?.and_then(element_text),
                first_match(item, "a.link")?.and_then(|a| element_attr(a, "href")),
                first_match(item, "span.price")?.and_then(element_text),
            ));
        }
        Ok(listings)
    }
}

fn engine() -> CrawlEngine {
    CrawlEngine::from_config(&FetcherConfig::default()).expect("Failed to build engine")
}

fn item(name: &str, url: &str, price: &str) -> String {
    format!(
        r#"<li class="item"><span class="name">{}</span><a class="link" href="{}">x</a><span class="price">{}</span></li>"#,
        name, url, price
    )
}

fn page(items: &[String], page_links: &[String]) -> String {
    let links: String = page_links
        .iter()
        .map(|href| format!(r#"<a class="page" href="{}">more</a>"#, href))
        .collect();
    format!(
        "<html><body><ul>{}</ul><div>{}</div></body></html>",
        items.concat(),
        links
    )
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_page_crawl_preserves_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "shoes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            &[item("A", "u1", "10")],
            &[format!("{}/p2", base)],
        )))
        .expect(1)
        .mount(&server)
        .await;
    mount_html(&server, "/p2", page(&[item("B", "u2", "20")], &[])).await;

    let listings = engine()
        .query(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    assert_eq!(
        listings,
        vec![Listing::new("A", "u1", "10"), Listing::new("B", "u2", "20")]
    );
}

#[tokio::test]
async fn test_pages_visited_in_discovery_order() {
    let server = MockServer::start().await;

    // Relative links, listed out of numeric order on purpose
    mount_html(
        &server,
        "/search",
        page(
            &[item("A", "u1", "1"), item("B", "u2", "2")],
            &["/p3".to_string(), "/p2".to_string()],
        ),
    )
    .await;
    mount_html(&server, "/p3", page(&[item("C", "u3", "3")], &[])).await;
    mount_html(&server, "/p2", page(&[item("D", "u4", "4")], &[])).await;

    let listings = engine()
        .query(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    let names: Vec<_> = listings.iter().map(Listing::name).collect();
    assert_eq!(names, vec!["A", "B", "C", "D"]);
}

#[tokio::test]
async fn test_first_page_server_error_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = engine()
        .crawl(&TestAdapter::new(&server), "shoes")
        .await
        .expect("First-page failure must not be an error");

    assert!(outcome.listings.is_empty());
    assert_eq!(outcome.pages_fetched, 0);
    assert_eq!(outcome.failures.len(), 1);
}

#[tokio::test]
async fn test_failed_second_page_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/search",
        page(&[item("A", "u1", "10")], &[format!("{}/p2", base)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let outcome = engine()
        .crawl(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.listings, vec![Listing::new("A", "u1", "10")]);
    assert_eq!(outcome.pages_fetched, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url, format!("{}/p2", base));
}

#[tokio::test]
async fn test_crawl_continues_after_failed_page() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/search",
        page(
            &[item("A", "u1", "1")],
            &["/missing".to_string(), "/p3".to_string()],
        ),
    )
    .await;
    mount_html(&server, "/p3", page(&[item("C", "u3", "3")], &[])).await;

    let listings = engine()
        .query(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    let names: Vec<_> = listings.iter().map(Listing::name).collect();
    assert_eq!(names, vec!["A", "C"]);
}

#[tokio::test]
async fn test_extraction_error_only_drops_that_page() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/search",
        page(
            &[item("A", "u1", "1")],
            &["/p2".to_string(), "/p3".to_string()],
        ),
    )
    .await;
    mount_html(
        &server,
        "/p2",
        r#"<html><body><div id="broken"></div></body></html>"#.to_string(),
    )
    .await;
    mount_html(&server, "/p3", page(&[item("C", "u3", "3")], &[])).await;

    let outcome = engine()
        .crawl(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    let names: Vec<_> = outcome.listings.iter().map(Listing::name).collect();
    assert_eq!(names, vec!["A", "C"]);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.failures.len(), 1);
}

#[tokio::test]
async fn test_missing_price_gets_placeholder() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/search",
        r#"<html><body><ul>
            <li class="item"><span class="name">A</span><a class="link" href="u1">x</a></li>
        </ul></body></html>"#
            .to_string(),
    )
    .await;

    let listings = engine()
        .query(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    assert_eq!(listings, vec![Listing::new("A", "u1", UNKNOWN_PRICE)]);
}

#[tokio::test]
async fn test_repeated_page_link_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/search",
        page(
            &[item("A", "u1", "1")],
            &[
                format!("{}/p2", base),
                format!("{}/p2", base),
                format!("{}/search?q=shoes", base),
            ],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[item("B", "u2", "2")], &[])))
        .expect(1)
        .mount(&server)
        .await;

    let listings = engine()
        .query(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    assert_eq!(listings.len(), 2);
}

#[tokio::test]
async fn test_redirected_first_page_not_refetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/results", base).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page(&[item("A", "u1", "1")], &["/results".to_string()])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = engine()
        .crawl(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.listings, vec![Listing::new("A", "u1", "1")]);
    assert_eq!(outcome.pages_fetched, 1);
    assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn test_later_pages_are_not_searched_for_links() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/search",
        page(&[item("A", "u1", "1")], &["/p2".to_string()]),
    )
    .await;
    mount_html(
        &server,
        "/p2",
        page(&[item("B", "u2", "2")], &["/p3".to_string()]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[item("C", "u3", "3")], &[])))
        .expect(0)
        .mount(&server)
        .await;

    let listings = engine()
        .query(&TestAdapter::new(&server), "shoes")
        .await
        .expect("Crawl failed");

    assert_eq!(
        listings,
        vec![Listing::new("A", "u1", "1"), Listing::new("B", "u2", "2")]
    );
}

/// Extracts like [`TestAdapter`] but cannot find the page bar
struct NoPageBarAdapter(TestAdapter);

impl SiteAdapter for NoPageBarAdapter {
    fn name(&self) -> &str {
        "no-page-bar"
    }

    fn query_template(&self) -> &str {
        self.0.query_template()
    }

    fn discover_pages(&self, _doc: &PageDocument) -> Result<Pagination, AdapterError> {
        Err(AdapterError::InvalidSelector("div.pager".to_string()))
    }

    fn extract_listings(&self, doc: &PageDocument) -> Result<Vec<RawListing>, AdapterError> {
        self.0.extract_listings(doc)
    }
}

#[tokio::test]
async fn test_discovery_error_keeps_first_page_listings() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/search",
        page(&[item("A", "u1", "1"), item("B", "u2", "2")], &["/p2".to_string()]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[], &[])))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = NoPageBarAdapter(TestAdapter::new(&server));
    let outcome = engine()
        .crawl(&adapter, "shoes")
        .await
        .expect("Crawl failed");

    assert_eq!(
        outcome.listings,
        vec![Listing::new("A", "u1", "1"), Listing::new("B", "u2", "2")]
    );
    assert_eq!(outcome.pages_fetched, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].url.ends_with("/search?q=shoes"));
}

#[tokio::test]
async fn test_unsupported_pagination_reads_first_page_only() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/mosearch/shoes.html",
        r#"<html><body>
        <div id="searchResults"><ul id="chessboard">
          <li><a href="/goods/1"></a><span id="goods_name"><a>Runner</a></span><span class="money">$900</span></li>
        </ul></div>
        <a class="page" href="/mosearch/shoes.html?page=2">2</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    let adapter = MomoAdapter::with_template(format!("{}/mosearch/%s.html", server.uri()));
    let outcome = engine().crawl(&adapter, "shoes").await.expect("Crawl failed");

    assert_eq!(outcome.pages_fetched, 1);
    assert!(outcome.failures.is_empty());
    assert_eq!(
        outcome.listings,
        vec![Listing::new(
            "Runner",
            format!("{}/goods/1", server.uri()),
            "$900"
        )]
    );
}

#[tokio::test]
async fn test_books_adapter_follows_page_bar() {
    let server = MockServer::start().await;
    let base = server.uri();

    let books_page = |title: &str, page_bar: &str| {
        format!(
            r#"<html><body><div class="cntlisearch10"><ul>
            <li class="item"><div class="input_buy"></div>
              <h3><a title="{title}" href="/products/{title}">{title}</a></h3>
              <span class="price"><b>100</b></span></li>
            </ul><div class="page">{page_bar}</div></div></body></html>"#
        )
    };

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("key", "rust book"))
        .respond_with(ResponseTemplate::new(200).set_body_string(books_page(
            "first",
            r#"<span class="here">1</span><a href="/page/2">2</a><a class="nxt" href="/page/2">&gt;</a>"#,
        )))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/page/2",
        books_page("second", r#"<a href="/search">1</a><span class="here">2</span>"#),
    )
    .await;

    let adapter = BooksAdapter::with_template(format!("{}/search?key=%s&cat=all", base));
    let listings = engine()
        .query(&adapter, "rust book")
        .await
        .expect("Crawl failed");

    assert_eq!(
        listings,
        vec![
            Listing::new("first", format!("{}/products/first", base), "100"),
            Listing::new("second", format!("{}/products/second", base), "100"),
        ]
    );
}

#[tokio::test]
async fn test_expired_deadline_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page(&[item("A", "u1", "1")], &[]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let deadline = Instant::now() + Duration::from_millis(50);
    let outcome = engine()
        .crawl_until(&TestAdapter::new(&server), "shoes", Some(deadline))
        .await
        .expect("Timeout must not be an error");

    assert!(outcome.listings.is_empty());
    assert_eq!(outcome.failures.len(), 1);
}

#[tokio::test]
async fn test_runner_continues_after_failing_site() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/search",
        page(&[item("A", "u1", "10"), item("B", "u2", "20")], &[]),
    )
    .await;

    let adapters: Vec<Box<dyn SiteAdapter>> = vec![
        Box::new(BooksAdapter::with_template("not a url %s")),
        Box::new(TestAdapter::new(&server)),
    ];
    let runner = Runner::new(engine(), adapters);

    let mut emitted = Vec::new();
    let summary = runner
        .run("shoes", |source, listing| {
            emitted.push((source.to_string(), listing.clone()))
        })
        .await;

    assert_eq!(
        emitted,
        vec![
            ("test".to_string(), Listing::new("A", "u1", "10")),
            ("test".to_string(), Listing::new("B", "u2", "20")),
        ]
    );
    assert_eq!(summary.per_source.len(), 2);
    assert!(summary.per_source[0].error.is_some());
    assert_eq!(summary.per_source[1].listings, 2);
    assert_eq!(summary.total_listings(), 2);
}
