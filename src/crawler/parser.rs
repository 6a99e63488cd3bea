//! Item document parser
//!
//! Turns the markup of a single item page into an `ItemRecord`. The title and
//! the creation timestamp are required; author, score and comment count fall
//! back to empty/zero when their markers are missing.

use crate::crawler::extract::{between, between_reverse};
use crate::item::{Category, InvalidReason, ItemRecord, ItemStatus, ParseResult};
use chrono::{DateTime, NaiveDateTime, Utc};

const TITLE_START: &str = r#"<td class="title">"#;
const TITLE_END: &str = "</td>";
const COMMENT_TITLE_START: &str = r#"<td class="default">"#;
const COMMENT_TITLE_END: &str = r#"<div class="comment">"#;
const AGE_START: &str = r#"<span class="age" title=""#;
const AGE_END: &str = "\"";
const AUTHOR_START: &str = r#"class="hnuser">"#;
const AUTHOR_END: &str = "</a>";
const SCORE_START: &str = r#"<span class="score""#;
const SCORE_END: &str = "points</span>";
const COMMENTS_SUFFIX: &str = "&nbsp;comments</a>";
const COMMENTS_PREFIX: &str = "\">";

/// Parses an item document
///
/// The returned record carries `Category::Unlabeled`; the category an item is
/// stored under is decided by whoever writes it.
///
/// # Example
///
/// ```
/// use redflag::crawler::parse_item;
/// use redflag::item::ParseResult;
///
/// let doc = r#"<td class="title"><a href="https://example.com">Hello</a></td>
///     <span class="age" title="2021-07-14T09:24:32"><a>1 hour ago</a></span>"#;
/// match parse_item(1, doc) {
///     ParseResult::Valid(record) => assert_eq!(record.score, 0),
///     ParseResult::Invalid(reason) => panic!("{}", reason),
/// }
/// ```
pub fn parse_item(id: i64, doc: &str) -> ParseResult {
    let (title, is_post) = match between(doc, TITLE_START, TITLE_END) {
        Some(title) => (title, true),
        None => match between(doc, COMMENT_TITLE_START, COMMENT_TITLE_END) {
            Some(title) => (title, false),
            None => {
                tracing::debug!("can't find title for item {}", id);
                return ParseResult::Invalid(InvalidReason::TitleNotFound);
            }
        },
    };

    let status = ItemStatus::from_title(title);

    let Some(raw_time) = between(doc, AGE_START, AGE_END) else {
        tracing::debug!("can't find post time for item {}", id);
        return ParseResult::Invalid(InvalidReason::MissingTimestamp);
    };
    let created_at = match parse_timestamp(raw_time) {
        Some(ts) => ts,
        None => {
            tracing::debug!("malformed post time '{}' for item {}", raw_time, id);
            return ParseResult::Invalid(InvalidReason::MalformedTimestamp(raw_time.to_string()));
        }
    };

    let author = between(doc, AUTHOR_START, AUTHOR_END).unwrap_or("");
    let score = parse_score(id, between(doc, SCORE_START, SCORE_END));
    let comment_count = parse_count(
        id,
        "comment count",
        between_reverse(doc, COMMENTS_SUFFIX, COMMENTS_PREFIX),
    );

    let record = ItemRecord {
        id,
        category: Category::Unlabeled,
        title: title.to_string(),
        score,
        comment_count,
        author: author.to_string(),
        created_at,
        status,
        is_post,
    };

    tracing::trace!("raw post fields: {:?}", record);

    ParseResult::Valid(record)
}

/// Parses the age tooltip
///
/// The tooltip holds an ISO-8601 timestamp, optionally followed by a unix
/// timestamp after a space. Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let text = raw.split_whitespace().next()?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// The score region looks like ` id="score_1">42 ` so the number follows the
/// first '>'
fn parse_score(id: i64, region: Option<&str>) -> i64 {
    let region = match region {
        Some(region) if !region.is_empty() => region,
        _ => return 0,
    };

    let number = match region.find('>') {
        Some(pos) => &region[pos + 1..],
        None => region,
    };

    parse_count(id, "score", Some(number))
}

fn parse_count(id: i64, field: &str, text: Option<&str>) -> i64 {
    let text = match text.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return 0,
    };

    match text.parse::<i64>() {
        Ok(value) if value >= 0 => value,
        _ => {
            tracing::warn!("item {}: unparsable {} '{}', using 0", id, field, text);
            0
        }
    }
}
