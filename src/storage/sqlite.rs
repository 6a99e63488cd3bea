//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::item::{Category, ItemRecord, ItemStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunCounters, RunRecord, RunStatus};
use crate::RedflagError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const ITEM_COLUMNS: &str =
    "entry_id, category, title, score, comment_count, author, created_at, status, is_post";

const RUN_COLUMNS: &str = "id, strategy, started_at, finished_at, config_hash, status, \
     inserted, updated, unchanged, skipped, pages";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and bootstraps the schema
    pub fn new(path: &Path) -> Result<Self, RedflagError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, RedflagError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Formats a timestamp the way it is stored in `posts.created_at`
///
/// Fixed-width UTC text keeps `ORDER BY created_at` chronological. Precision
/// is whole seconds: any fractional part is dropped, so a record read back
/// compares equal only when its timestamp had none.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<ItemRecord> {
    let category_value: i64 = row.get(1)?;
    let category = Category::from_db_value(category_value)
        .ok_or_else(|| conversion_error(1, format!("unknown category {}", category_value)))?;

    let created_raw: String = row.get(6)?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(6, format!("bad created_at '{}': {}", created_raw, e)))?;

    let status_value: i64 = row.get(7)?;
    let status = ItemStatus::from_db_value(status_value)
        .ok_or_else(|| conversion_error(7, format!("unknown status {}", status_value)))?;

    Ok(ItemRecord {
        id: row.get(0)?,
        category,
        title: row.get(2)?,
        score: row.get(3)?,
        comment_count: row.get(4)?,
        author: row.get(5)?,
        created_at,
        status,
        is_post: row.get(8)?,
    })
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        strategy: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
        counters: RunCounters {
            inserted: row.get::<_, i64>(6)? as u64,
            updated: row.get::<_, i64>(7)? as u64,
            unchanged: row.get::<_, i64>(8)? as u64,
            skipped: row.get::<_, i64>(9)? as u64,
            pages: row.get::<_, i64>(10)? as u64,
        },
    })
}

impl Storage for SqliteStorage {
    // ===== Items =====

    fn find_by_id(&self, id: i64) -> StorageResult<Option<ItemRecord>> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {} FROM posts WHERE entry_id = ?1", ITEM_COLUMNS),
                params![id],
                row_to_item,
            )
            .optional()?;

        if let Some(item) = &item {
            tracing::trace!("key {} found entry: {:?}", id, item);
        }

        Ok(item)
    }

    fn insert(&mut self, record: &ItemRecord, category: Category) -> StorageResult<()> {
        tracing::trace!("insert post record {:?} category {}", record, category);
        self.conn.execute(
            &format!(
                "INSERT INTO posts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                ITEM_COLUMNS
            ),
            params![
                record.id,
                category.to_db_value(),
                record.title,
                record.score,
                record.comment_count,
                record.author,
                format_timestamp(&record.created_at),
                record.status.to_db_value(),
                record.is_post,
            ],
        )?;
        Ok(())
    }

    fn update(&mut self, record: &ItemRecord, category: Category) -> StorageResult<()> {
        tracing::trace!("update post record {:?} category {}", record, category);
        let changed = self.conn.execute(
            "UPDATE posts SET category = ?1, title = ?2, score = ?3, comment_count = ?4,
             author = ?5, created_at = ?6, status = ?7, is_post = ?8 WHERE entry_id = ?9",
            params![
                category.to_db_value(),
                record.title,
                record.score,
                record.comment_count,
                record.author,
                format_timestamp(&record.created_at),
                record.status.to_db_value(),
                record.is_post,
                record.id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::ItemNotFound(record.id));
        }
        Ok(())
    }

    fn find_non_active(&self, is_post: Option<bool>) -> StorageResult<Vec<ItemRecord>> {
        let active = ItemStatus::Active.to_db_value();

        let items = match is_post {
            Some(is_post) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM posts WHERE status <> ?1 AND is_post = ?2
                     ORDER BY created_at DESC, entry_id DESC",
                    ITEM_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![active, is_post], row_to_item)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM posts WHERE status <> ?1
                     ORDER BY created_at DESC, entry_id DESC",
                    ITEM_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![active], row_to_item)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(items)
    }

    fn find_boundary_entry(&self, latest: bool) -> StorageResult<Option<i64>> {
        let order = if latest { "DESC" } else { "ASC" };
        let id = self
            .conn
            .query_row(
                &format!(
                    "SELECT entry_id FROM posts ORDER BY created_at {}, entry_id {} LIMIT 1",
                    order, order
                ),
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    // ===== Statistics =====

    fn count_items(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_status(&self) -> StorageResult<HashMap<ItemStatus, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM posts GROUP BY status")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;

        let mut counts = HashMap::new();
        for row in rows {
            let (value, count) = row?;
            let status = ItemStatus::from_db_value(value)
                .ok_or_else(|| StorageError::Corrupt(format!("unknown status {}", value)))?;
            counts.insert(status, count as u64);
        }

        Ok(counts)
    }

    fn count_by_category(&self) -> StorageResult<HashMap<Category, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, COUNT(*) FROM posts GROUP BY category")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;

        let mut counts = HashMap::new();
        for row in rows {
            let (value, count) = row?;
            let category = Category::from_db_value(value)
                .ok_or_else(|| StorageError::Corrupt(format!("unknown category {}", value)))?;
            counts.insert(category, count as u64);
        }

        Ok(counts)
    }

    // ===== Run Management =====

    fn create_run(&mut self, strategy: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (strategy, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                strategy,
                now,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counters: &RunCounters,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, inserted = ?3, updated = ?4,
             unchanged = ?5, skipped = ?6, pages = ?7 WHERE id = ?8",
            params![
                status.to_db_string(),
                now,
                counters.inserted as i64,
                counters.updated as i64,
                counters.unchanged as i64,
                counters.skipped as i64,
                counters.pages as i64,
                run_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                row_to_run,
            )
            .optional()?;
        Ok(run)
    }
}
