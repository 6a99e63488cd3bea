//! Statistics generation from the item store
//!
//! This module provides functionality for extracting and displaying
//! store statistics: item totals, moderation breakdown, boundary entries and
//! the latest run.

use crate::item::{Category, ItemStatus};
use crate::storage::{RunRecord, Storage, StorageResult};
use std::collections::HashMap;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of items stored
    pub total_items: u64,

    /// Count of items by moderation status
    pub items_by_status: HashMap<ItemStatus, u64>,

    /// Count of items by the listing they were first seen on
    pub items_by_category: HashMap<Category, u64>,

    /// Id of the least recently created item
    pub min_entry: Option<i64>,

    /// Id of the most recently created item
    pub max_entry: Option<i64>,

    pub latest_run: Option<RunRecord>,
}

impl StoreStatistics {
    pub fn status_count(&self, status: ItemStatus) -> u64 {
        self.items_by_status.get(&status).copied().unwrap_or(0)
    }

    /// Items that are flagged or deleted
    pub fn moderated(&self) -> u64 {
        self.status_count(ItemStatus::Flagged) + self.status_count(ItemStatus::Deleted)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_items: storage.count_items()?,
        items_by_status: storage.count_by_status()?,
        items_by_category: storage.count_by_category()?,
        min_entry: storage.find_boundary_entry(false)?,
        max_entry: storage.find_boundary_entry(true)?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Total items: {}", stats.total_items);
    println!(
        "  Moderated items: {} ({:.1}%)",
        stats.moderated(),
        percentage(stats.moderated(), stats.total_items)
    );
    if let Some(min) = stats.min_entry {
        println!("  Oldest entry: {}", min);
    }
    if let Some(max) = stats.max_entry {
        println!("  Newest entry: {}", max);
    }
    println!();

    println!("Items by Status:");
    for status in ItemStatus::all() {
        let count = stats.status_count(status);
        println!(
            "  {}: {} ({:.1}%)",
            status,
            count,
            percentage(count, stats.total_items)
        );
    }
    println!();

    println!("Items by Category:");
    for category in Category::all() {
        let count = stats.items_by_category.get(&category).copied().unwrap_or(0);
        println!("  {}: {}", category, count);
    }
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  Id: {} ({})", run.id, run.strategy);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!(
                "  Inserted: {}, updated: {}, unchanged: {}, skipped: {}, batches: {}",
                run.counters.inserted,
                run.counters.updated,
                run.counters.unchanged,
                run.counters.skipped,
                run.counters.pages
            );
        }
        None => println!("No runs recorded"),
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemRecord;
    use crate::storage::{RunCounters, RunStatus, SqliteStorage};
    use chrono::{TimeZone, Utc};

    fn item(id: i64, status: ItemStatus, day: u32) -> ItemRecord {
        ItemRecord {
            id,
            category: Category::Unlabeled,
            title: format!("item {}", id),
            score: 1,
            comment_count: 0,
            author: "carol".to_string(),
            created_at: Utc.with_ymd_and_hms(2021, 8, day, 0, 0, 0).unwrap(),
            status,
            is_post: true,
        }
    }

    #[test]
    fn test_load_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.insert(&item(10, ItemStatus::Active, 2), Category::Main).unwrap();
        storage.insert(&item(11, ItemStatus::Flagged, 3), Category::Main).unwrap();
        storage.insert(&item(12, ItemStatus::Deleted, 1), Category::Show).unwrap();

        let run_id = storage.create_run("range", "hash").unwrap();
        let counters = RunCounters {
            inserted: 3,
            ..Default::default()
        };
        storage.finish_run(run_id, RunStatus::Completed, &counters).unwrap();

        let stats = load_statistics(&storage).unwrap();

        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.status_count(ItemStatus::Active), 1);
        assert_eq!(stats.moderated(), 2);
        assert_eq!(stats.items_by_category.get(&Category::Main), Some(&2));
        assert_eq!(stats.min_entry, Some(12));
        assert_eq!(stats.max_entry, Some(11));
        assert_eq!(stats.latest_run.unwrap().counters.inserted, 3);
    }

    #[test]
    fn test_empty_store_statistics() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();

        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.moderated(), 0);
        assert!(stats.min_entry.is_none());
        assert!(stats.latest_run.is_none());
        assert_eq!(percentage(0, 0), 0.0);
    }
}
