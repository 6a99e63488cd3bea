//! Item records and parse results

use crate::item::{Category, ItemStatus};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// One entry in the site's catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: i64,
    pub category: Category,
    pub title: String,
    pub score: i64,
    pub comment_count: i64,
    /// Empty when the attribution was removed
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub status: ItemStatus,
    /// True for top-level submissions, false for comment-only documents
    pub is_post: bool,
}

impl ItemRecord {
    /// Age of the item relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// True when the fields tracked for moderation changed between two
    /// sightings of the same item (status, score, comment count)
    pub fn differs_from(&self, other: &ItemRecord) -> bool {
        self.status != other.status
            || self.score != other.score
            || self.comment_count != other.comment_count
    }
}

/// Why an item document could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("title not found")]
    TitleNotFound,

    #[error("missing timestamp")]
    MissingTimestamp,

    #[error("malformed timestamp '{0}'")]
    MalformedTimestamp(String),
}

/// Outcome of parsing an item document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    Valid(ItemRecord),
    Invalid(InvalidReason),
}
