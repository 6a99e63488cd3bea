//! Reconciliation engine
//!
//! Resolves one candidate id at a time against the store:
//! - unseen ids are fetched, parsed and inserted
//! - seen ids younger than the staleness window are re-fetched and
//!   overwritten only when status, score or comment count changed
//! - seen ids older than the window are left alone without a fetch

use crate::config::SiteConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::parse_item;
use crate::item::{Category, InvalidReason, ItemRecord, ParseResult};
use crate::storage::{RunCounters, Storage};
use crate::RedflagError;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Why a candidate was abandoned for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FetchFailed(String),
    Invalid(InvalidReason),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed(error) => write!(f, "fetch failed: {}", error),
            Self::Invalid(reason) => write!(f, "invalid document: {}", reason),
        }
    }
}

/// What reconciling a single id did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Inserted,
    Updated,
    Unchanged,
    Skipped(SkipReason),
}

impl ReconcileOutcome {
    /// True when the store was written
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }

    /// Adds this outcome to a run's counters
    pub fn record(&self, counters: &mut RunCounters) {
        match self {
            Self::Inserted => counters.inserted += 1,
            Self::Updated => counters.updated += 1,
            Self::Unchanged => counters.unchanged += 1,
            Self::Skipped(_) => counters.skipped += 1,
        }
    }
}

/// Per-id state machine over a fetcher and a store
pub struct Reconciler<'a> {
    fetcher: &'a dyn Fetcher,
    storage: &'a mut dyn Storage,
    site: SiteConfig,
    staleness: Duration,
    now: DateTime<Utc>,
}

impl<'a> Reconciler<'a> {
    /// Creates an engine whose clock is fixed at `now`
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of item documents
    /// * `storage` - Item store; the engine owns the read-modify-write per id
    /// * `site` - Used to build item URLs
    /// * `staleness_days` - Age at which stored items stop being re-checked
    /// * `now` - Reference time for age computations
    pub fn new(
        fetcher: &'a dyn Fetcher,
        storage: &'a mut dyn Storage,
        site: SiteConfig,
        staleness_days: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            fetcher,
            storage,
            site,
            staleness: Duration::days(i64::from(staleness_days)),
            now,
        }
    }

    /// Resolves one candidate
    ///
    /// Fetch and parse failures are outcomes; only store failures are errors.
    pub async fn reconcile(
        &mut self,
        id: i64,
        category: Category,
    ) -> Result<ReconcileOutcome, RedflagError> {
        let outcome = match self.storage.find_by_id(id)? {
            None => self.reconcile_unseen(id, category).await?,
            Some(stored) => self.reconcile_seen(stored, category).await?,
        };

        match &outcome {
            ReconcileOutcome::Inserted => tracing::info!("inserted item {} ({})", id, category),
            ReconcileOutcome::Updated => tracing::info!("updated item {} ({})", id, category),
            ReconcileOutcome::Unchanged => tracing::debug!("item {} unchanged", id),
            ReconcileOutcome::Skipped(reason) => tracing::debug!("skipped item {}: {}", id, reason),
        }

        Ok(outcome)
    }

    async fn reconcile_unseen(
        &mut self,
        id: i64,
        category: Category,
    ) -> Result<ReconcileOutcome, RedflagError> {
        let record = match self.fetch_and_parse(id).await {
            Ok(record) => record,
            Err(reason) => return Ok(ReconcileOutcome::Skipped(reason)),
        };

        self.storage.insert(&record, category)?;
        Ok(ReconcileOutcome::Inserted)
    }

    async fn reconcile_seen(
        &mut self,
        stored: ItemRecord,
        category: Category,
    ) -> Result<ReconcileOutcome, RedflagError> {
        if stored.age(self.now) >= self.staleness {
            tracing::trace!("item {} is past the staleness window", stored.id);
            return Ok(ReconcileOutcome::Unchanged);
        }

        let fresh = match self.fetch_and_parse(stored.id).await {
            Ok(record) => record,
            Err(reason) => {
                tracing::debug!("keeping stored item {}: {}", stored.id, reason);
                return Ok(ReconcileOutcome::Unchanged);
            }
        };

        if !fresh.differs_from(&stored) {
            return Ok(ReconcileOutcome::Unchanged);
        }

        tracing::debug!(
            "item {} changed: status {} -> {}, score {} -> {}, comments {} -> {}",
            stored.id,
            stored.status,
            fresh.status,
            stored.score,
            fresh.score,
            stored.comment_count,
            fresh.comment_count
        );

        self.storage.update(&fresh, category)?;
        Ok(ReconcileOutcome::Updated)
    }

    async fn fetch_and_parse(&self, id: i64) -> Result<ItemRecord, SkipReason> {
        let url = self.site.item_url(id);
        let result = self.fetcher.fetch(&url).await;

        let Some(doc) = result.body() else {
            return Err(SkipReason::FetchFailed(result.describe_failure()));
        };

        match parse_item(id, doc) {
            ParseResult::Valid(record) => Ok(record),
            ParseResult::Invalid(reason) => Err(SkipReason::Invalid(reason)),
        }
    }
}
