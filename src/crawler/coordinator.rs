//! Crawler coordinator - main crawl orchestration logic
//!
//! This module ties a frontier to the reconciliation engine, including:
//! - Creating and finishing the run row
//! - Pulling candidate batches from the frontier
//! - Reconciling every candidate in order
//! - Aggregating outcome counters and progress reporting
//! - Stopping a listing walk early after idle pages, when configured

use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, PaginationFrontier, RangeFrontier};
use crate::crawler::reconcile::Reconciler;
use crate::item::Category;
use crate::storage::{RunCounters, RunStatus, Storage};
use crate::RedflagError;
use chrono::{DateTime, Utc};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: i64,
    pub strategy: String,
    pub counters: RunCounters,
    /// True when the idle-page limit cut the walk short
    pub stopped_early: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator<'a> {
    config: &'a Config,
    fetcher: &'a dyn Fetcher,
    storage: &'a mut dyn Storage,
    config_hash: String,
    now: DateTime<Utc>,
}

impl<'a> Coordinator<'a> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Source of listing and item documents
    /// * `storage` - Item store and run bookkeeping
    /// * `config_hash` - Hash of the config file, recorded on the run row
    ///
    /// The reference time for staleness checks is taken here, once.
    pub fn new(
        config: &'a Config,
        fetcher: &'a dyn Fetcher,
        storage: &'a mut dyn Storage,
        config_hash: impl Into<String>,
    ) -> Self {
        Self::with_clock(config, fetcher, storage, config_hash, Utc::now())
    }

    /// Same as `new` with an explicit reference time
    pub fn with_clock(
        config: &'a Config,
        fetcher: &'a dyn Fetcher,
        storage: &'a mut dyn Storage,
        config_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            fetcher,
            storage,
            config_hash: config_hash.into(),
            now,
        }
    }

    /// Runs a frontier to exhaustion
    ///
    /// The run row is marked completed on success and failed when a store
    /// error ends the run.
    pub async fn run(&mut self, frontier: &mut dyn Frontier) -> Result<RunSummary, RedflagError> {
        let strategy = frontier.strategy();
        let run_id = self.storage.create_run(&strategy, &self.config_hash)?;
        tracing::info!("Starting {} run {}", strategy, run_id);

        let start_time = std::time::Instant::now();
        let mut counters = RunCounters::default();

        match self.drive(frontier, &mut counters).await {
            Ok(stopped_early) => {
                self.storage
                    .finish_run(run_id, RunStatus::Completed, &counters)?;

                tracing::info!(
                    "Run {} completed in {:?}: {} written ({} inserted, {} updated), {} unchanged, {} skipped over {} batches",
                    run_id,
                    start_time.elapsed(),
                    counters.written(),
                    counters.inserted,
                    counters.updated,
                    counters.unchanged,
                    counters.skipped,
                    counters.pages
                );

                Ok(RunSummary {
                    run_id,
                    strategy,
                    counters,
                    stopped_early,
                })
            }
            Err(e) => {
                tracing::error!("Run {} failed: {}", run_id, e);
                if let Err(finish_err) =
                    self.storage
                        .finish_run(run_id, RunStatus::Failed, &counters)
                {
                    tracing::error!("Could not mark run {} as failed: {}", run_id, finish_err);
                }
                Err(e)
            }
        }
    }

    /// Main loop; returns whether the idle-page limit stopped it
    async fn drive(
        &mut self,
        frontier: &mut dyn Frontier,
        counters: &mut RunCounters,
    ) -> Result<bool, RedflagError> {
        let idle_limit = self.config.crawler.idle_page_limit;
        let mut idle_pages = 0u32;

        let mut engine = Reconciler::new(
            self.fetcher,
            &mut *self.storage,
            self.config.site.clone(),
            self.config.crawler.staleness_days,
            self.now,
        );

        while let Some(batch) = frontier.next_batch(self.fetcher).await {
            counters.pages += 1;
            let mut written = 0u64;

            for id in &batch.ids {
                let outcome = engine.reconcile(*id, batch.category).await?;
                outcome.record(counters);
                if outcome.is_write() {
                    written += 1;
                }
            }

            // Listing pages only; a range batch is a single id
            if batch.page > 0 {
                tracing::info!(
                    "page {}: {} candidates, {} inserted or updated",
                    batch.page,
                    batch.ids.len(),
                    written
                );

                idle_pages = if written == 0 { idle_pages + 1 } else { 0 };
                if let Some(limit) = idle_limit {
                    if idle_pages >= limit {
                        tracing::info!("{} consecutive pages without changes, stopping", idle_pages);
                        return Ok(true);
                    }
                }
            } else if counters.pages % 100 == 0 {
                tracing::info!(
                    "Progress: {} ids visited, {} inserted, {} updated",
                    counters.visited(),
                    counters.inserted,
                    counters.updated
                );
            }
        }

        tracing::info!("Frontier exhausted");
        Ok(false)
    }
}

/// Runs a descending range scan
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `storage` - Open item store
/// * `config_hash` - Recorded on the run row
/// * `from` - Highest id to visit; resolved from the site when `None`
/// * `to` - Exclusive lower bound
///
/// # Errors
///
/// `RedflagError::FrontierExhausted` when `from` is `None` and no id can be
/// found on the latest-activity listing. Store failures end the run.
///
/// # Example
///
/// ```no_run
/// use redflag::config::load_config;
/// use redflag::crawler::run_range_crawl;
/// use redflag::storage::open_storage;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let mut storage = open_storage(Path::new(&config.database.path))?;
/// run_range_crawl(&config, &mut storage, "hash", None, 0).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_range_crawl(
    config: &Config,
    storage: &mut dyn Storage,
    config_hash: &str,
    from: Option<i64>,
    to: i64,
) -> Result<RunSummary, RedflagError> {
    let fetcher = HttpFetcher::from_config(&config.user_agent, config.crawler.request_timeout_secs)?;
    let mut frontier = RangeFrontier::resolve(from, to, &fetcher, &config.site).await?;
    tracing::info!("Scanning ids {} down to {} (exclusive)", frontier.cursor(), to);

    let mut coordinator = Coordinator::new(config, &fetcher, storage, config_hash);
    coordinator.run(&mut frontier).await
}

/// Walks a listing forward for up to `max_pages - 1` pages
pub async fn run_listing_crawl(
    config: &Config,
    storage: &mut dyn Storage,
    config_hash: &str,
    category: Category,
    max_pages: u32,
) -> Result<RunSummary, RedflagError> {
    let fetcher = HttpFetcher::from_config(&config.user_agent, config.crawler.request_timeout_secs)?;
    let mut frontier = PaginationFrontier::new(category, max_pages, &config.site);

    let mut coordinator = Coordinator::new(config, &fetcher, storage, config_hash);
    coordinator.run(&mut frontier).await
}
