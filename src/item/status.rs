//! Moderation status and listing category definitions
//!
//! Both enums are persisted as small integers, matching the column layout of
//! the `posts` table.

use std::fmt;

/// Moderation status of an item, derived from markers inside its title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    /// Visible, no moderation marker
    Active,

    /// Title carries the "[flagged]" marker
    Flagged,

    /// Title carries the "[deleted]" marker
    Deleted,
}

impl ItemStatus {
    pub const FLAGGED_MARKER: &'static str = "[flagged]";
    pub const DELETED_MARKER: &'static str = "[deleted]";

    /// Derives the status from a title
    ///
    /// The deleted check runs last, so a title carrying both markers is
    /// reported as deleted.
    pub fn from_title(title: &str) -> Self {
        let mut status = Self::Active;
        if title.contains(Self::FLAGGED_MARKER) {
            status = Self::Flagged;
        }
        if title.contains(Self::DELETED_MARKER) {
            status = Self::Deleted;
        }
        status
    }

    pub fn to_db_value(&self) -> i64 {
        match self {
            Self::Active => 1,
            Self::Flagged => 2,
            Self::Deleted => 3,
        }
    }

    pub fn from_db_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Active),
            2 => Some(Self::Flagged),
            3 => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns all statuses
    pub fn all() -> [Self; 3] {
        [Self::Active, Self::Flagged, Self::Deleted]
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Flagged => "flagged",
            Self::Deleted => "deleted",
        };
        write!(f, "{}", name)
    }
}

/// Index listing that produced the first sighting of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// The "newest" listing, also used for id-range scans
    Unlabeled,

    /// Front page
    Main,

    Ask,

    Show,
}

impl Category {
    /// Path of the listing on the site, relative to the site root
    pub fn listing_path(&self) -> &'static str {
        match self {
            Self::Unlabeled => "newest",
            Self::Main => "news",
            Self::Ask => "ask",
            Self::Show => "show",
        }
    }

    /// True for the listing that paginates through a continuation token
    /// instead of page numbers
    pub fn uses_continuation_token(&self) -> bool {
        matches!(self, Self::Unlabeled)
    }

    pub fn to_db_value(&self) -> i64 {
        match self {
            Self::Unlabeled => 0,
            Self::Main => 1,
            Self::Ask => 2,
            Self::Show => 3,
        }
    }

    pub fn from_db_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unlabeled),
            1 => Some(Self::Main),
            2 => Some(Self::Ask),
            3 => Some(Self::Show),
            _ => None,
        }
    }

    /// Returns all categories
    pub fn all() -> [Self; 4] {
        [Self::Unlabeled, Self::Main, Self::Ask, Self::Show]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.listing_path())
    }
}
