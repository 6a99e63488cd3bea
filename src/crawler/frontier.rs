//! Crawl frontiers
//!
//! A frontier decides which item ids are visited and in what order. Two
//! strategies exist:
//! - `RangeFrontier`: walks the dense id space downwards from a start id
//! - `PaginationFrontier`: walks a listing page by page, collecting the ids
//!   linked from each page
//!
//! Both are small state machines advanced explicitly by the caller; the
//! coordinator drives either one through the `Frontier` trait.

use crate::config::SiteConfig;
use crate::crawler::extract::{extract_continuation, extract_item_ids, ContinuationToken};
use crate::crawler::fetcher::Fetcher;
use crate::item::Category;
use crate::RedflagError;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// A group of candidate ids handed to the reconciliation engine together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBatch {
    /// Category new items from this batch are stored under
    pub category: Category,
    pub ids: Vec<i64>,
    /// Listing page number, or 0 for batches that don't come from a listing
    pub page: u32,
}

/// Traversal policy producing candidate ids
#[async_trait]
pub trait Frontier: Send {
    /// Short name recorded on the run row
    fn strategy(&self) -> String;

    /// Next batch of candidates, or `None` once the frontier is exhausted
    async fn next_batch(&mut self, fetcher: &dyn Fetcher) -> Option<CandidateBatch>;
}

// ===== Range frontier =====

/// Descending scan over `(lower, upper]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFrontier {
    cursor: i64,
    lower: i64,
}

impl RangeFrontier {
    /// Creates a frontier over an inclusive upper and exclusive lower bound
    ///
    /// # Example
    ///
    /// ```
    /// use redflag::crawler::RangeFrontier;
    ///
    /// let ids: Vec<i64> = RangeFrontier::new(105, 100).collect();
    /// assert_eq!(ids, vec![105, 104, 103, 102, 101]);
    /// ```
    pub fn new(upper: i64, lower: i64) -> Self {
        Self {
            cursor: upper,
            lower,
        }
    }

    /// Creates a frontier, resolving a missing upper bound from the site
    ///
    /// # Errors
    ///
    /// `RedflagError::FrontierExhausted` when `upper` is `None` and the
    /// latest-activity listing references no items.
    pub async fn resolve(
        upper: Option<i64>,
        lower: i64,
        fetcher: &dyn Fetcher,
        site: &SiteConfig,
    ) -> Result<Self, RedflagError> {
        let upper = match upper {
            Some(upper) => upper,
            None => find_highest_entry_id(fetcher, site).await?,
        };
        Ok(Self::new(upper, lower))
    }

    /// Yields the cursor and moves it down by one
    pub fn next_candidate(&mut self) -> Option<i64> {
        if self.cursor <= self.lower {
            return None;
        }
        let id = self.cursor;
        self.cursor -= 1;
        Some(id)
    }

    /// Next id that would be yielded (meaningless once exhausted)
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor <= self.lower
    }
}

impl Iterator for RangeFrontier {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        self.next_candidate()
    }
}

#[async_trait]
impl Frontier for RangeFrontier {
    fn strategy(&self) -> String {
        "range".to_string()
    }

    async fn next_batch(&mut self, _fetcher: &dyn Fetcher) -> Option<CandidateBatch> {
        let id = self.next_candidate()?;
        Some(CandidateBatch {
            category: Category::Unlabeled,
            ids: vec![id],
            page: 0,
        })
    }
}

/// Highest id linked from the site's latest-activity listing
///
/// A failed fetch is treated like an empty listing.
pub async fn find_highest_entry_id(
    fetcher: &dyn Fetcher,
    site: &SiteConfig,
) -> Result<i64, RedflagError> {
    let url = site.latest_activity_url();
    let result = fetcher.fetch(&url).await;

    let doc = match result.body() {
        Some(body) => body,
        None => {
            tracing::warn!("fetching {} failed: {}", url, result.describe_failure());
            ""
        }
    };

    match extract_item_ids(doc).into_iter().max() {
        Some(highest) => {
            tracing::info!("Highest entry id: {}", highest);
            Ok(highest)
        }
        None => {
            tracing::error!("can't find highest entry id at {}", url);
            Err(RedflagError::FrontierExhausted { url })
        }
    }
}

// ===== Pagination frontier =====

/// One fetched listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub number: u32,
    pub url: String,
    pub ids: BTreeSet<i64>,
}

/// Forward walk over a listing
///
/// Pages run from 1 up to, but not including, `max_pages`. Numbered listings
/// add `?{page_param}=N`; the "newest" listing follows the continuation token
/// found on the previous page and ends when a page carries none.
#[derive(Debug, Clone)]
pub struct PaginationFrontier {
    category: Category,
    max_pages: u32,
    listing_url: String,
    page_param: String,
    next_page: u32,
    last_token: Option<ContinuationToken>,
    end_of_listing: bool,
}

impl PaginationFrontier {
    pub fn new(category: Category, max_pages: u32, site: &SiteConfig) -> Self {
        Self {
            category,
            max_pages,
            listing_url: format!("{}/{}", site.root(), category.listing_path()),
            page_param: site.page_param.clone(),
            next_page: 1,
            last_token: None,
            end_of_listing: false,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Token carried over from the last fetched page
    pub fn last_token(&self) -> Option<&ContinuationToken> {
        self.last_token.as_ref()
    }

    /// True when the site ran out of "more" links
    pub fn reached_end_of_listing(&self) -> bool {
        self.end_of_listing
    }

    pub fn is_exhausted(&self) -> bool {
        self.end_of_listing || self.next_page >= self.max_pages
    }

    /// URL for `page`, given the current token state
    ///
    /// `None` when the listing needs a continuation token and none is held.
    pub fn page_url(&self, page: u32) -> Option<String> {
        if page <= 1 {
            return Some(self.listing_url.clone());
        }

        if self.category.uses_continuation_token() {
            let token = self.last_token.as_ref()?;
            Some(format!("{}?{}", self.listing_url, token.query()))
        } else {
            Some(format!("{}?{}={}", self.listing_url, self.page_param, page))
        }
    }

    /// Fetches the next listing page
    ///
    /// A failed fetch produces an empty page on numbered listings. On the
    /// "newest" listing a page without a continuation token (a failed fetch
    /// included) ends the walk and its items are not returned.
    pub async fn next_page(&mut self, fetcher: &dyn Fetcher) -> Option<ListingPage> {
        if self.is_exhausted() {
            return None;
        }

        let number = self.next_page;
        let Some(url) = self.page_url(number) else {
            self.end_of_listing = true;
            return None;
        };

        tracing::info!("scanning page {}: {}", number, url);
        let result = fetcher.fetch(&url).await;
        let doc = match result.body() {
            Some(body) => body,
            None => {
                tracing::warn!("fetching {} failed: {}", url, result.describe_failure());
                ""
            }
        };

        self.next_page += 1;

        if self.category.uses_continuation_token() {
            self.last_token = extract_continuation(doc);
            if self.last_token.is_none() {
                tracing::info!("no next page after {} (page {}), stopping", url, number);
                self.end_of_listing = true;
                return None;
            }
        }

        let ids = extract_item_ids(doc);

        tracing::debug!("page {} items: {:?}", url, ids);
        Some(ListingPage { number, url, ids })
    }
}

#[async_trait]
impl Frontier for PaginationFrontier {
    fn strategy(&self) -> String {
        format!("listing:{}", self.category)
    }

    async fn next_batch(&mut self, fetcher: &dyn Fetcher) -> Option<CandidateBatch> {
        let page = self.next_page(fetcher).await?;
        Some(CandidateBatch {
            category: self.category,
            ids: page.ids.into_iter().collect(),
            page: page.number,
        })
    }
}
