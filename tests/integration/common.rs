//! Shared fixtures for the integration tests

use chrono::{Duration, Utc};
use redflag::config::{parse_config, Config};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a validated configuration pointing at a mock server
pub fn create_test_config(base_url: &str, dir: &TempDir, extra_crawler: &str) -> Config {
    let db_path = dir.path().join("redflag.db");
    let site_dir = dir.path().join("site");

    parse_config(&format!(
        r#"
[site]
base-url = "{base_url}"

[crawler]
request-timeout-secs = 5
{extra_crawler}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[database]
path = "{db}"

[render]
output-dir = "{site}"
items-per-page = 2
"#,
        db = db_path.display(),
        site = site_dir.display(),
    ))
    .expect("test config is valid")
}

/// Item timestamp `hours` in the past, in the site's tooltip format
pub fn hours_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

/// Markup of a story page
pub fn story_doc(id: i64, title: &str, score: i64, comments: i64, posted: &str) -> String {
    format!(
        r#"<html><body><table class="fatitem">
<tr class="athing" id="{id}"><td class="title"><a href="https://example.com/{id}">{title}</a><span class="sitebit comhead"> (<a href="from?site=example.com">example.com</a>)</span></td></tr>
<tr><td class="subtext"><span class="score" id="score_{id}">{score} points</span> by <a href="user?id=alice" class="hnuser">alice</a>
<span class="age" title="{posted} 1626254672"><a href="item?id={id}">1 hour ago</a></span>
| <a href="item?id={id}">{comments}&nbsp;comments</a></td></tr>
</table></body></html>"#
    )
}

/// Markup of a comment page
pub fn comment_doc(id: i64, posted: &str) -> String {
    format!(
        r#"<html><body><table class="fatitem"><tr><td class="default">
<span class="comhead"><a href="user?id=bob" class="hnuser">bob</a>
<span class="age" title="{posted}"><a href="item?id={id}">1 hour ago</a></span></span>
<div class="comment">[flagged]</div></td></tr></table></body></html>"#
    )
}

/// Listing page linking the given ids
pub fn listing_doc(ids: &[i64], more: Option<&str>) -> String {
    let mut html = String::from("<html><body><table class=\"itemlist\">");
    for id in ids {
        html.push_str(&format!(
            r#"<tr class="athing" id="{id}"><td><a href="item?id={id}">link</a></td></tr>"#
        ));
    }
    if let Some(query) = more {
        html.push_str(&format!(
            r#"<a href="newest?{}" class="morelink" rel="next">More</a>"#,
            query
        ));
    }
    html.push_str("</table></body></html>");
    html
}

pub async fn mount_item(server: &MockServer, id: i64, body: String) {
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}
