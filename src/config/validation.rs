use crate::config::types::{
    Config, CrawlerConfig, DatabaseConfig, RenderConfig, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_database_config(&config.database)?;
    validate_render_config(&config.render)?;
    Ok(())
}

/// Validates the site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if url.query().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url cannot carry a query string, got '{}'",
            config.base_url
        )));
    }

    if config.page_param.is_empty()
        || !config
            .page_param
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "page-param must be a non-empty identifier, got '{}'",
            config.page_param
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.staleness_days < 1 {
        return Err(ConfigError::Validation(format!(
            "staleness-days must be >= 1, got {}",
            config.staleness_days
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    if config.idle_page_limit == Some(0) {
        return Err(ConfigError::Validation(
            "idle-page-limit must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if config.items_per_page < 1 || config.items_per_page > 500 {
        return Err(ConfigError::Validation(format!(
            "items-per-page must be between 1 and 500, got {}",
            config.items_per_page
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(base_url: &str) -> SiteConfig {
        SiteConfig {
            base_url: base_url.to_string(),
            page_param: "p".to_string(),
        }
    }

    #[test]
    fn test_validate_site() {
        assert!(validate_site_config(&site("https://news.ycombinator.com")).is_ok());
        assert!(validate_site_config(&site("http://127.0.0.1:8080/")).is_ok());

        assert!(validate_site_config(&site("not a url")).is_err());
        assert!(validate_site_config(&site("ftp://example.com")).is_err());
        assert!(validate_site_config(&site("https://example.com/?x=1")).is_err());
    }

    #[test]
    fn test_validate_page_param() {
        let mut config = site("https://example.com");
        config.page_param = "".to_string();
        assert!(validate_site_config(&config).is_err());

        config.page_param = "p&x".to_string();
        assert!(validate_site_config(&config).is_err());

        config.page_param = "page".to_string();
        assert!(validate_site_config(&config).is_ok());
    }

    #[test]
    fn test_validate_crawler() {
        assert!(validate_crawler_config(&CrawlerConfig::default()).is_ok());

        let mut config = CrawlerConfig::default();
        config.staleness_days = 0;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = CrawlerConfig::default();
        config.request_timeout_secs = 0;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = CrawlerConfig::default();
        config.idle_page_limit = Some(0);
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_validate_render() {
        assert!(validate_render_config(&RenderConfig::default()).is_ok());

        let mut config = RenderConfig::default();
        config.items_per_page = 0;
        assert!(validate_render_config(&config).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
