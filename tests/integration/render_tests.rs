//! Static rendering of a crawled store

use crate::common::*;
use redflag::crawler::run_range_crawl;
use redflag::output::{load_statistics, render_site};
use redflag::storage::open_storage;
use redflag::ItemStatus;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn test_crawl_then_render() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, "");

    mount_item(&server, 5, story_doc(5, "[flagged] Five", 9, 3, &hours_ago(1))).await;
    mount_item(&server, 4, story_doc(4, "[deleted]", 2, 0, &hours_ago(2))).await;
    mount_item(&server, 3, story_doc(3, "Three", 1, 0, &hours_ago(3))).await;
    mount_item(&server, 2, story_doc(2, "[flagged] Two", 1, 0, &hours_ago(4))).await;
    mount_item(&server, 1, comment_doc(1, &hours_ago(5))).await;

    let mut storage = open_storage(Path::new(&config.database.path)).unwrap();
    run_range_crawl(&config, &mut storage, "h", Some(5), 0)
        .await
        .unwrap();

    let stats = load_statistics(&storage).unwrap();
    assert_eq!(stats.total_items, 5);
    assert_eq!(stats.status_count(ItemStatus::Flagged), 2);
    assert_eq!(stats.max_entry, Some(5));
    assert_eq!(stats.min_entry, Some(1));

    let written = render_site(&storage, &config.site, &config.render).unwrap();
    assert_eq!(written.len(), 2);

    let first = fs::read_to_string(&written[0]).unwrap();
    assert!(first.contains("[flagged] Five"));
    assert!(first.contains(r#"<span class="rank">2.</span>"#));
    assert!(first.contains(&format!(r#"href="{}/from?site=example.com""#, server.uri())));
    assert!(first.contains(r#"href="page_2.html""#));
    assert!(!first.contains("Three"));

    let second = fs::read_to_string(&written[1]).unwrap();
    assert!(second.contains("[flagged] Two"));
    assert!(second.contains(r#"<span class="rank">3.</span>"#));
    assert!(!second.contains("morelink"));
}
