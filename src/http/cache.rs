//! HTTP cache control module
//!
//! Provides `Last-Modified` formatting and conditional request handling.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::SystemTime;

/// Cache policy applied to every response: browsers must always refetch
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate";

/// IMF-fixdate layout used by `Last-Modified` and `If-Modified-Since`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a modification time as an HTTP date
///
/// # Returns
/// e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format(HTTP_DATE_FORMAT)
        .to_string()
}

/// Parse an HTTP date (IMF-fixdate, or any RFC 2822 date)
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc2822(value).map(|d| d.with_timezone(&Utc)))
        .ok()
}

/// Check whether the client's cached copy is still current
///
/// `If-None-Match` takes precedence over `If-Modified-Since`; since no
/// entity tags are issued, its presence disables the date check.
///
/// # Arguments
/// * `if_modified_since` - Client-sent If-Modified-Since header
/// * `has_if_none_match` - Whether the request carries If-None-Match
/// * `modified` - File modification time
///
/// # Returns
/// Returns true if a 304 should be sent
pub fn is_not_modified(
    if_modified_since: Option<&str>,
    has_if_none_match: bool,
    modified: SystemTime,
) -> bool {
    if has_if_none_match {
        return false;
    }
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    // HTTP dates have one second resolution
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}
