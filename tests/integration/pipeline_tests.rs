//! Integration tests for the full crawl-load pipeline
//!
//! These tests run the pipeline against a wiremock wiki and inspect the
//! resulting SQLite database directly.

mod common;

use common::*;
use wiki_etl::output::Stage;
use wiki_etl::storage::SqliteStorage;
use wiki_etl::{run_pipeline, Pipeline};
use wiremock::MockServer;

#[tokio::test]
async fn test_extraction_errors_are_not_fatal() {
    let server = MockServer::start().await;

    let children: Vec<String> = (0..10).map(|i| format!("Child{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    mount_article(&server, "Seed", &child_refs, 1).await;

    for (i, child) in children.iter().enumerate() {
        if i % 3 == 0 && i > 0 {
            mount_untitled(&server, child).await;
        } else {
            mount_article(&server, child, &[], 1).await;
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("etl.db");
    let mut config = test_config(&server, "Seed", &db, 1);
    config.crawler.max_links_per_page = 10;

    let report = run_pipeline(config).await.unwrap();

    // Child3, Child6 and Child9 have no title
    assert_eq!(report.counts.pages_attempted, 11);
    assert_eq!(report.counts.pages_succeeded, 8);
    assert_eq!(report.error_count(), 3);
    assert!(report.errors.iter().all(|e| e.kind == "missing-title"));
    assert!(report.load_succeeded());
    assert!(!report.is_clean());

    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM staging_pages WHERE depth = 1"),
        7
    );
    assert_eq!(report.counts.pages_loaded, 8);
}

#[tokio::test]
async fn test_rerun_is_full_refresh() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["A", "B", "Stub"], 2).await;
    mount_article(&server, "A", &["B", "Stub"], 2).await;
    mount_article(&server, "B", &["A"], 2).await;
    mount_html(
        &server,
        "Stub",
        article_html(Some("Stub"), "Stub.", &[]),
        2,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("etl.db");
    let config = test_config(&server, "Seed", &db, 2);

    let first = run_pipeline(config.clone()).await.unwrap();
    let staging_pages = count(&db, "SELECT COUNT(*) FROM staging_pages");
    let staging_links = count(&db, "SELECT COUNT(*) FROM staging_page_links");
    let production = strings(&db, "SELECT url FROM production_pages ORDER BY url");
    let production_links = strings(
        &db,
        "SELECT source_url || ' ' || target_url FROM production_page_links ORDER BY 1",
    );

    let second = run_pipeline(config).await.unwrap();

    assert!(first.is_clean());
    assert!(second.is_clean());
    assert_eq!(first.config_hash, second.config_hash);
    assert_eq!(staging_pages, 4);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM staging_pages"), staging_pages);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM staging_page_links"), staging_links);
    assert_eq!(
        strings(&db, "SELECT url FROM production_pages ORDER BY url"),
        production
    );
    assert_eq!(
        strings(
            &db,
            "SELECT source_url || ' ' || target_url FROM production_page_links ORDER BY 1"
        ),
        production_links
    );
}

#[tokio::test]
async fn test_production_is_filtered_subset_of_staging() {
    let server = MockServer::start().await;

    mount_article(&server, "Seed", &["Full", "Stub", "Missing"], 1).await;
    mount_article(&server, "Full", &["Seed", "Stub"], 1).await;
    mount_stub(&server, "Stub").await;
    mount_status(&server, "Missing", 404, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("etl.db");
    let report = run_pipeline(test_config(&server, "Seed", &db, 1)).await.unwrap();

    assert_eq!(report.counts.pages_loaded, 3);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM production_pages"), 2);

    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM production_pages \
             WHERE title IS NULL OR length(content) <= 50"
        ),
        0
    );
    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM production_pages \
             WHERE url NOT IN (SELECT url FROM staging_pages)"
        ),
        0
    );
    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM production_page_links \
             WHERE source_url NOT IN (SELECT url FROM production_pages) \
             OR target_url NOT IN (SELECT url FROM production_pages)"
        ),
        0
    );

    // Seed -> Full and Full -> Seed survive; edges to Stub and Missing do not
    assert_eq!(count(&db, "SELECT COUNT(*) FROM production_page_links"), 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM staging_page_links"), 5);
}

#[tokio::test]
async fn test_load_retry_without_recrawl() {
    let server = MockServer::start().await;

    // Each page is served once: the retry must reuse the crawl output
    mount_article(&server, "Seed", &["A"], 1).await;
    mount_article(&server, "A", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let unusable = dir.path().join("not-a-file");
    std::fs::create_dir(&unusable).unwrap();

    let pipeline = Pipeline::new(test_config(&server, "Seed", &unusable, 1)).unwrap();
    let output = pipeline.crawl().await.unwrap();

    let err = pipeline.load(&output).unwrap_err();
    assert_eq!(err.kind(), "write-failure");

    let db = dir.path().join("retry.db");
    let mut storage = SqliteStorage::new(&db).unwrap();
    let loaded = pipeline.load_into(&mut storage, &output).unwrap();

    assert_eq!(loaded.pages_loaded, 2);
    assert_eq!(loaded.links_loaded, 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM production_pages"), 2);
}

#[tokio::test]
async fn test_load_failure_is_reported() {
    let server = MockServer::start().await;
    mount_article(&server, "Seed", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let unusable = dir.path().join("not-a-file");
    std::fs::create_dir(&unusable).unwrap();

    let report = run_pipeline(test_config(&server, "Seed", &unusable, 0))
        .await
        .unwrap();

    assert_eq!(report.counts.pages_succeeded, 1);
    assert_eq!(report.counts.pages_loaded, 0);
    assert!(!report.load_succeeded());
    assert_eq!(report.errors_in(Stage::Load).count(), 1);
}

#[tokio::test]
async fn test_report_when_every_fetch_fails() {
    let server = MockServer::start().await;
    mount_status(&server, "Seed", 404, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("etl.db");
    let report = run_pipeline(test_config(&server, "Seed", &db, 2)).await.unwrap();

    assert_eq!(report.counts.pages_succeeded, 0);
    assert_eq!(report.errors_in(Stage::Fetch).count(), 1);
    assert!(report.load_succeeded());
    assert_eq!(count(&db, "SELECT COUNT(*) FROM staging_pages"), 0);
    assert_eq!(report.pages_per_minute, 0.0);
}
