//! End-to-end crawl tests
//!
//! These tests use wiremock to stand in for the site and exercise the range
//! scan and listing walk through the public entry points.

use crate::common::*;
use redflag::crawler::{run_listing_crawl, run_range_crawl};
use redflag::storage::{open_storage, RunStatus, Storage};
use redflag::{Category, ItemStatus, RedflagError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_range_crawl_resolves_upper_bound() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, "");
    let posted = hours_ago(2);

    mount_page(&server, "/newcomments", listing_doc(&[101, 103, 102], None)).await;
    mount_item(&server, 103, story_doc(103, "[flagged] Third", 5, 2, &posted)).await;
    mount_item(&server, 102, comment_doc(102, &posted)).await;
    mount_item(&server, 101, story_doc(101, "First", 40, 12, &posted)).await;

    let mut storage = open_storage(Path::new(&config.database.path)).unwrap();
    let summary = run_range_crawl(&config, &mut storage, "hash-1", None, 100)
        .await
        .unwrap();

    assert_eq!(summary.counters.inserted, 3);
    assert_eq!(summary.counters.skipped, 0);

    let third = storage.find_by_id(103).unwrap().unwrap();
    assert_eq!(third.status, ItemStatus::Flagged);
    assert_eq!(third.category, Category::Unlabeled);
    assert_eq!(third.score, 5);
    assert!(third.is_post);

    let comment = storage.find_by_id(102).unwrap().unwrap();
    assert!(!comment.is_post);
    assert_eq!(comment.author, "bob");

    let first = storage.find_by_id(101).unwrap().unwrap();
    assert_eq!(first.comment_count, 12);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.strategy, "range");
    assert_eq!(run.config_hash, "hash-1");
}

#[tokio::test]
async fn test_range_crawl_skips_missing_items() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, "");

    mount_item(&server, 12, story_doc(12, "Kept", 1, 0, &hours_ago(1))).await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_string("No such item."))
        .mount(&server)
        .await;
    // id 13 is not mounted at all: wiremock answers 404

    let mut storage = open_storage(Path::new(&config.database.path)).unwrap();
    let summary = run_range_crawl(&config, &mut storage, "h", Some(13), 10)
        .await
        .unwrap();

    assert_eq!(summary.counters.inserted, 1);
    assert_eq!(summary.counters.skipped, 2);
    assert_eq!(storage.count_items().unwrap(), 1);
    assert!(storage.find_by_id(11).unwrap().is_none());
}

#[tokio::test]
async fn test_range_crawl_without_ids_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, "");

    mount_page(&server, "/newcomments", "<html>nothing</html>".to_string()).await;

    let mut storage = open_storage(Path::new(&config.database.path)).unwrap();
    let err = run_range_crawl(&config, &mut storage, "h", None, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, RedflagError::FrontierExhausted { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(storage.get_latest_run().unwrap().is_none());
}

#[tokio::test]
async fn test_recrawl_updates_changed_items_only() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, "");
    let posted = hours_ago(3);

    mount_item(&server, 2, story_doc(2, "Two", 10, 5, &posted)).await;
    mount_item(&server, 1, story_doc(1, "One", 7, 1, &posted)).await;

    let mut storage = open_storage(Path::new(&config.database.path)).unwrap();
    run_range_crawl(&config, &mut storage, "h", Some(2), 0)
        .await
        .unwrap();
    let created = storage.find_by_id(2).unwrap().unwrap().created_at;

    server.reset().await;
    let reposted = hours_ago(1);
    mount_item(&server, 2, story_doc(2, "[deleted]", 10, 6, &reposted)).await;
    mount_item(&server, 1, story_doc(1, "One", 7, 1, &posted)).await;

    let summary = run_range_crawl(&config, &mut storage, "h", Some(2), 0)
        .await
        .unwrap();

    assert_eq!(summary.counters.updated, 1);
    assert_eq!(summary.counters.unchanged, 1);

    let two = storage.find_by_id(2).unwrap().unwrap();
    assert_eq!(two.status, ItemStatus::Deleted);
    assert_eq!(two.comment_count, 6);
    assert_ne!(two.created_at, created);
    assert_eq!(
        two.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        reposted
    );
}

#[tokio::test]
async fn test_follow_numbered_listing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, "");
    let posted = hours_ago(1);

    Mock::given(method("GET"))
        .and(path("/show"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_doc(&[30], None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/show"))
        .and(query_param("p", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_doc(&[29], None)))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/show", listing_doc(&[31, 32], None)).await;

    for id in [29, 30, 31, 32] {
        mount_item(&server, id, story_doc(id, "Show: thing", 3, 0, &posted)).await;
    }

    let mut storage = open_storage(Path::new(&config.database.path)).unwrap();
    let summary = run_listing_crawl(&config, &mut storage, "h", Category::Show, 3)
        .await
        .unwrap();

    assert_eq!(summary.strategy, "listing:show");
    assert_eq!(summary.counters.pages, 2);
    assert_eq!(summary.counters.inserted, 3);
    assert_eq!(
        storage.find_by_id(30).unwrap().unwrap().category,
        Category::Show
    );
    assert!(storage.find_by_id(29).unwrap().is_none());

    server.verify().await;
}

#[tokio::test]
async fn test_follow_newest_until_end_of_listing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, "");
    let posted = hours_ago(1);

    Mock::given(method("GET"))
        .and(path("/newest"))
        .and(query_param("next", "49"))
        .and(query_param("n", "31"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_doc(&[49], None)))
        .mount(&server)
        .await;
    mount_page(&server, "/newest", listing_doc(&[50], Some("next=49&amp;n=31"))).await;
    mount_item(&server, 50, story_doc(50, "Fifty", 1, 0, &posted)).await;
    mount_item(&server, 49, story_doc(49, "Forty-nine", 1, 0, &posted)).await;

    let mut storage = open_storage(Path::new(&config.database.path)).unwrap();
    let summary = run_listing_crawl(&config, &mut storage, "h", Category::Unlabeled, 4000)
        .await
        .unwrap();

    // The page at next=49 carries no token, so the walk ends before its items
    assert_eq!(summary.counters.pages, 1);
    assert_eq!(summary.counters.inserted, 1);
    assert_eq!(
        storage.find_by_id(50).unwrap().unwrap().category,
        Category::Unlabeled
    );
    assert!(storage.find_by_id(49).unwrap().is_none());
}

#[tokio::test]
async fn test_follow_stops_after_idle_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, "idle-page-limit = 1");

    // Every page fails to fetch, so nothing is ever written
    let mut storage = open_storage(Path::new(&config.database.path)).unwrap();
    let summary = run_listing_crawl(&config, &mut storage, "h", Category::Main, 4000)
        .await
        .unwrap();

    assert!(summary.stopped_early);
    assert_eq!(summary.counters.pages, 1);
}
