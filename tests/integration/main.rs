//! Integration tests for redflag
//!
//! These tests run the crawler against wiremock servers standing in for the
//! site, with the item store in a temporary directory.

mod common;
mod crawl_tests;
mod render_tests;
