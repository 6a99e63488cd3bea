//! Redflag: a moderation tracker for a link-aggregator site
//!
//! This crate discovers items on a server-rendered news site, extracts their
//! fields from the markup, and keeps a SQLite store in sync with the site's
//! current score, comment count and moderation status. Items that were flagged
//! or deleted can then be rendered into a static mirror.

pub mod config;
pub mod crawler;
pub mod item;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for redflag operations
#[derive(Debug, Error)]
pub enum RedflagError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("No item ids found at {url}, cannot resolve the highest entry id")]
    FrontierExhausted { url: String },

    #[error("Render error: {0}")]
    Render(#[from] output::RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RedflagError {
    /// Process exit code for this error
    ///
    /// An unresolvable range frontier gets its own code so wrapper scripts can
    /// tell "the site returned nothing" apart from ordinary failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FrontierExhausted { .. } => 2,
            _ => 1,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for redflag operations
pub type Result<T> = std::result::Result<T, RedflagError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use item::{Category, ItemRecord, ItemStatus};
