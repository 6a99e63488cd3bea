//! Output module for rendering and reporting stored data
//!
//! This module handles:
//! - Rendering flagged and deleted posts into a static HTML mirror
//! - Reporting store statistics and run history

pub mod html;
pub mod stats;

pub use html::render_site;
pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type RenderResult<T> = Result<T, RenderError>;
