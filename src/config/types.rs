use serde::Deserialize;

/// Main configuration structure for redflag
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Where the crawled site lives and how its listings are paginated
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root, without trailing slash (e.g. "https://news.ycombinator.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Query parameter carrying the page number on numbered listings
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,
}

impl SiteConfig {
    /// Base URL with any trailing slash removed
    pub fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// URL of a single item document
    pub fn item_url(&self, id: i64) -> String {
        format!("{}/item?id={}", self.root(), id)
    }

    /// URL of the "latest activity" listing used to find the highest id
    pub fn latest_activity_url(&self) -> String {
        format!("{}/newcomments", self.root())
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Stored items older than this many days are never re-fetched
    #[serde(rename = "staleness-days", default = "default_staleness_days")]
    pub staleness_days: u32,

    /// Overall request timeout handed to the HTTP client (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Stop a listing walk after this many consecutive pages without changes
    #[serde(rename = "idle-page-limit", default)]
    pub idle_page_limit: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            staleness_days: default_staleness_days(),
            request_timeout_secs: default_request_timeout(),
            idle_page_limit: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

/// Static page output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Directory receiving the page_N.html files
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,

    #[serde(rename = "items-per-page", default = "default_items_per_page")]
    pub items_per_page: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            items_per_page: default_items_per_page(),
        }
    }
}

fn default_page_param() -> String {
    "p".to_string()
}

fn default_staleness_days() -> u32 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_output_dir() -> String {
    "./site".to_string()
}

fn default_items_per_page() -> usize {
    30
}
