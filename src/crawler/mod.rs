//! Crawler module for item discovery and reconciliation
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - Marker-based extraction and item parsing
//! - Range and pagination frontiers
//! - The per-id reconciliation engine
//! - Overall crawl coordination

mod coordinator;
mod extract;
mod fetcher;
mod frontier;
mod parser;
mod reconcile;

pub use coordinator::{run_listing_crawl, run_range_crawl, Coordinator, RunSummary};
pub use extract::{
    between, between_reverse, extract_continuation, extract_item_ids, ContinuationToken,
};
pub use fetcher::{build_http_client, fetch_url, user_agent_string, FetchResult, Fetcher, HttpFetcher};
pub use frontier::{
    find_highest_entry_id, CandidateBatch, Frontier, ListingPage, PaginationFrontier,
    RangeFrontier,
};
pub use parser::{parse_item, parse_timestamp};
pub use reconcile::{ReconcileOutcome, Reconciler, SkipReason};
