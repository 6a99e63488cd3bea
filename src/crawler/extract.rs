//! Marker-based field extraction
//!
//! The site's markup is not well-formed enough for a DOM parser to be worth
//! its weight, so fields are cut out of the raw document with substring
//! searches between fixed marker strings. Listing pages are scanned with two
//! regular expressions: item links and the "newest" continuation link.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Returns the text between the first `start` marker and the next `end`
/// marker after it
///
/// # Example
///
/// ```
/// use redflag::crawler::between;
///
/// let doc = r#"<span class="age" title="2021-07-14T09:24:32">"#;
/// assert_eq!(between(doc, r#"title=""#, "\""), Some("2021-07-14T09:24:32"));
/// assert_eq!(between(doc, "<td>", "</td>"), None);
/// ```
pub fn between<'a>(doc: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let Some(start_pos) = doc.find(start) else {
        tracing::trace!("can't find start marker: {}", start);
        return None;
    };
    let from = start_pos + start.len();

    let Some(end_offset) = doc[from..].find(end) else {
        tracing::trace!("can't find end marker: {}", end);
        return None;
    };

    Some(&doc[from..from + end_offset])
}

/// Returns the text between the last `end` marker preceding the first
/// `start` marker, and that `start` marker
///
/// Used for values that sit right before a fixed suffix, where the opening
/// delimiter is too common to search forward for.
///
/// # Example
///
/// ```
/// use redflag::crawler::between_reverse;
///
/// let doc = r#"<a href="item?id=1">12&nbsp;comments</a>"#;
/// assert_eq!(between_reverse(doc, "&nbsp;comments</a>", "\">"), Some("12"));
/// ```
pub fn between_reverse<'a>(doc: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let Some(start_pos) = doc.find(start) else {
        tracing::trace!("can't find start marker: {}", start);
        return None;
    };

    let Some(end_pos) = doc[..start_pos].rfind(end) else {
        tracing::trace!("can't find end marker: {}", end);
        return None;
    };

    Some(&doc[end_pos + end.len()..start_pos])
}

fn item_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"href="item\?id=(\d+)""#).expect("valid item link regex"))
}

fn continuation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"href="newest\?next=(\d*)&amp;n=(\d+)""#).expect("valid continuation regex")
    })
}

/// Collects every id referenced by an item link, deduplicated
pub fn extract_item_ids(doc: &str) -> BTreeSet<i64> {
    item_link_pattern()
        .captures_iter(doc)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<i64>().ok())
        .collect()
}

/// Site-supplied cursor for the next page of the "newest" listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken {
    pub next_id: String,
    pub next_n: String,
}

impl ContinuationToken {
    /// Query string selecting the page this token points at
    pub fn query(&self) -> String {
        format!("next={}&n={}", self.next_id, self.next_n)
    }
}

/// Finds the "more" link of the "newest" listing
pub fn extract_continuation(doc: &str) -> Option<ContinuationToken> {
    let caps = continuation_pattern().captures(doc)?;
    Some(ContinuationToken {
        next_id: caps.get(1)?.as_str().to_string(),
        next_n: caps.get(2)?.as_str().to_string(),
    })
}
