//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small mock wiki and exercise the
//! crawl phase end-to-end.

mod common;

use common::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiki_etl::config::Config;
use wiki_etl::crawler::{Coordinator, CrawlOutput};
use wiki_etl::output::Stage;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn crawl(config: Config) -> CrawlOutput {
    Coordinator::new(Arc::new(config))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed")
}

fn depth_of(output: &CrawlOutput, url: &str) -> Option<u32> {
    output
        .records
        .iter()
        .find(|r| r.url == url)
        .map(|r| r.depth)
}

#[tokio::test]
async fn test_depth_is_shortest_distance_through_cycles() {
    let server = MockServer::start().await;

    // Seed -> A, B; A -> Seed, B, C; B -> A, D; C -> Seed; D -> E
    mount_article(&server, "Seed", &["A", "B"], 1).await;
    mount_article(&server, "A", &["Seed", "B", "C"], 1).await;
    mount_article(&server, "B", &["A", "D"], 1).await;
    mount_article(&server, "C", &["Seed"], 1).await;
    mount_article(&server, "D", &["E"], 1).await;
    mount_article(&server, "E", &[], 0).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 2)).await;

    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    assert_eq!(output.records.len(), 5);
    assert_eq!(output.pages_attempted, 5);
    assert_eq!(output.levels_completed, 3);

    assert_eq!(depth_of(&output, &page_url(&server, "Seed")), Some(0));
    assert_eq!(depth_of(&output, &page_url(&server, "A")), Some(1));
    assert_eq!(depth_of(&output, &page_url(&server, "B")), Some(1));
    assert_eq!(depth_of(&output, &page_url(&server, "C")), Some(2));
    assert_eq!(depth_of(&output, &page_url(&server, "D")), Some(2));
    assert_eq!(depth_of(&output, &page_url(&server, "E")), None);

    // Edges are kept even when the target was never fetched
    assert_eq!(output.links_discovered(), 9);
    assert!(output
        .edges
        .iter()
        .any(|e| e.target_url == page_url(&server, "E")));
}

#[tokio::test]
async fn test_no_url_recorded_twice() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["A", "B", "A"], 1).await;
    mount_article(&server, "A", &["B", "Seed"], 1).await;
    mount_article(&server, "B", &["A", "Seed"], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 3)).await;

    let urls: HashSet<&str> = output.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls.len(), output.records.len());
    assert_eq!(output.records.len(), 3);

    // Nothing new after depth 1, so the crawl stops early
    assert_eq!(output.levels_completed, 2);
}

#[tokio::test]
async fn test_parents_are_deterministic() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["A", "B"], 1).await;
    mount_article(&server, "A", &["Shared"], 1).await;
    mount_article(&server, "B", &["Shared"], 1).await;
    mount_article(&server, "Shared", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 2)).await;

    let shared = output
        .records
        .iter()
        .find(|r| r.url == page_url(&server, "Shared"))
        .unwrap();
    assert_eq!(shared.parent_url, Some(page_url(&server, "A")));

    let order: Vec<String> = output.records.iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        order,
        vec![
            page_url(&server, "Seed"),
            page_url(&server, "A"),
            page_url(&server, "B"),
            page_url(&server, "Shared"),
        ]
    );
}

#[tokio::test]
async fn test_links_per_page_cap() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["L1", "L2", "L3", "L4", "L5"], 1).await;
    mount_article(&server, "L1", &[], 1).await;
    mount_article(&server, "L2", &[], 1).await;
    mount_article(&server, "L3", &[], 0).await;
    mount_article(&server, "L4", &[], 0).await;
    mount_article(&server, "L5", &[], 0).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server, "Seed", &dir.path().join("t.db"), 1);
    config.crawler.max_links_per_page = 2;
    let output = crawl(config).await;

    assert_eq!(output.records.len(), 3);
    // The cap limits traversal, not the recorded graph
    assert_eq!(output.links_discovered(), 5);
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["A"], 1).await;
    mount_article(&server, "A", &[], 0).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 0)).await;

    assert_eq!(output.records.len(), 1);
    assert_eq!(output.levels_completed, 1);
    assert_eq!(output.links_discovered(), 1);
}

#[tokio::test]
async fn test_excluded_namespaces_never_fetched() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["Category:Cities", "File:Map.png", "Real"], 1).await;
    mount_article(&server, "Category:Cities", &[], 0).await;
    mount_article(&server, "File:Map.png", &[], 0).await;
    mount_article(&server, "Real", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 1)).await;

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.links_discovered(), 1);
}

#[tokio::test]
async fn test_rate_limited_page_retried_then_reported() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["Busy"], 1).await;
    mount_status(&server, "Busy", 429, 3).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 1)).await;

    assert_eq!(output.records.len(), 1);
    assert_eq!(output.errors.len(), 1);

    let error = &output.errors[0];
    assert_eq!(error.stage, Stage::Fetch);
    assert_eq!(error.kind, "http-status");
    assert_eq!(error.identifier, page_url(&server, "Busy"));
    assert!(error.message.contains("after 3 attempt(s)"));
}

#[tokio::test]
async fn test_server_error_recovers_on_retry() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["Flaky"], 1).await;

    // First two requests fail, the third reaches the healthy mock
    Mock::given(method("GET"))
        .and(path("/wiki/Flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_article(&server, "Flaky", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 1)).await;

    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    assert_eq!(output.records.len(), 2);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["Gone"], 1).await;
    mount_status(&server, "Gone", 404, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 1)).await;

    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0].message.contains("HTTP 404"));
    assert!(output.errors[0].message.contains("after 1 attempt(s)"));
}

#[tokio::test]
async fn test_seed_failure_still_finishes() {
    let server = MockServer::start().await;
    mount_status(&server, "Seed", 500, 3).await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 2)).await;

    assert!(output.records.is_empty());
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.levels_completed, 1);
}

#[tokio::test]
async fn test_last_modified_header_recorded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Seed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(article_html(Some("Seed"), LONG_TEXT, &[]), "text/html")
                .insert_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = crawl(test_config(&server, "Seed", &dir.path().join("t.db"), 0)).await;

    let modified = output.records[0].last_modified.expect("header parsed");
    assert_eq!(modified.to_rfc3339(), "2015-10-21T07:28:00+00:00");
}

/// Seed linking to `Child1..=Child{n}`, each child answering after `delay`
async fn mount_fan_out(server: &MockServer, n: usize, delay: Duration) {
    let children: Vec<String> = (1..=n).map(|i| format!("Child{}", i)).collect();
    let slugs: Vec<&str> = children.iter().map(String::as_str).collect();
    mount_article(server, "Seed", &slugs, 1).await;

    for child in &children {
        Mock::given(method("GET"))
            .and(path(format!("/wiki/{}", child)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(article_html(Some(child), LONG_TEXT, &[]), "text/html")
                    .set_delay(delay),
            )
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_request_timeout_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(article_html(Some("Slow"), LONG_TEXT, &[]), "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server, "Slow", &dir.path().join("t.db"), 0);
    config.crawler.request_timeout_secs = 1;
    config.crawler.max_retries = 2;

    let output = crawl(config).await;

    assert!(output.records.is_empty());
    assert_eq!(output.errors.len(), 1);

    let error = &output.errors[0];
    assert_eq!(error.stage, Stage::Fetch);
    assert_eq!(error.kind, "timeout");
    assert!(error.message.contains("after 2 attempt(s)"), "{}", error.message);
}

#[tokio::test]
async fn test_connection_refused_fails_without_retry() {
    // Reserve a port, then close it so nothing is listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let dir = tempfile::tempdir().unwrap();
    let base = format!("http://127.0.0.1:{}", port);
    let mut config = config_for(&base, "Seed", &dir.path().join("t.db"), 0);
    config.crawler.retry_base_delay_ms = 2000;

    let started = Instant::now();
    let output = crawl(config).await;
    let elapsed = started.elapsed();

    assert!(output.records.is_empty());
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].kind, "transport");

    // A single backoff would already cost two seconds
    assert!(elapsed < Duration::from_millis(1500), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_concurrency_bound_queues_requests() {
    let server = MockServer::start().await;
    mount_fan_out(&server, 8, Duration::from_millis(200)).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server, "Seed", &dir.path().join("t.db"), 1);
    config.crawler.max_concurrent_requests = 2;

    let started = Instant::now();
    let output = crawl(config).await;
    let elapsed = started.elapsed();

    // Requests beyond the bound wait for a slot instead of failing
    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    assert_eq!(output.records.len(), 9);

    // Eight slow children through two slots take at least four rounds
    assert!(elapsed >= Duration::from_millis(800), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_request_delay_paces_each_slot() {
    let server = MockServer::start().await;
    mount_fan_out(&server, 8, Duration::ZERO).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server, "Seed", &dir.path().join("t.db"), 1);
    config.crawler.max_concurrent_requests = 2;
    config.crawler.request_delay_ms = 250;

    let started = Instant::now();
    let output = crawl(config).await;
    let elapsed = started.elapsed();

    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    assert_eq!(output.records.len(), 9);

    // One delay for the seed, then four delays per slot for the children
    assert!(elapsed >= Duration::from_millis(1250), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_backoff_grows_between_attempts() {
    let server = MockServer::start().await;
    mount_status(&server, "Busy", 429, 3).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server, "Busy", &dir.path().join("t.db"), 0);
    config.crawler.retry_base_delay_ms = 100;

    let started = Instant::now();
    let output = crawl(config).await;
    let elapsed = started.elapsed();

    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0].message.contains("after 3 attempt(s)"));

    // 100ms then 200ms; a flat backoff would total 200ms
    assert!(elapsed >= Duration::from_millis(300), "took {:?}", elapsed);
}
