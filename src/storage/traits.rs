//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::item::{Category, ItemRecord, ItemStatus};
use crate::storage::{RunCounters, RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Writes are single statements and durable once they return; callers own
/// the read-modify-write sequence for a given item.
pub trait Storage {
    // ===== Items =====

    /// Looks up an item by id
    fn find_by_id(&self, id: i64) -> StorageResult<Option<ItemRecord>>;

    /// Inserts a new item under the given category
    ///
    /// The record's own `category` field is ignored; the caller decides which
    /// listing the item is attributed to.
    fn insert(&mut self, record: &ItemRecord, category: Category) -> StorageResult<()>;

    /// Overwrites an existing item by id
    ///
    /// # Errors
    ///
    /// `StorageError::ItemNotFound` when no row has this id.
    fn update(&mut self, record: &ItemRecord, category: Category) -> StorageResult<()>;

    /// Items whose status is not active, newest first
    ///
    /// `is_post` restricts the result to submissions (`Some(true)`) or
    /// comment-only documents (`Some(false)`).
    fn find_non_active(&self, is_post: Option<bool>) -> StorageResult<Vec<ItemRecord>>;

    /// Id of the most recently (`latest = true`) or least recently created item
    fn find_boundary_entry(&self, latest: bool) -> StorageResult<Option<i64>>;

    // ===== Statistics =====

    fn count_items(&self) -> StorageResult<u64>;

    fn count_by_status(&self) -> StorageResult<HashMap<ItemStatus, u64>>;

    fn count_by_category(&self) -> StorageResult<HashMap<Category, u64>>;

    // ===== Run Management =====

    /// Creates a new run in the running state and returns its id
    fn create_run(&mut self, strategy: &str, config_hash: &str) -> StorageResult<i64>;

    /// Records the final status and counters of a run
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counters: &RunCounters,
    ) -> StorageResult<()>;

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
