//! HTTP cache validation module
//!
//! Provides `ETag` / `Last-Modified` validators and evaluates conditional
//! request headers (`If-Match`, `If-None-Match`, `If-Modified-Since`,
//! `If-Unmodified-Since`, `If-Range`) against them.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDateTime, Utc};
use hyper::HeaderMap;

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 format
const RFC850_DATE: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// Obsolete asctime format
const ASCTIME_DATE: &str = "%a %b %e %H:%M:%S %Y";

/// Generate a strong `ETag` from file metadata, without reading the file
///
/// # Returns
/// Quoted `ETag` string of the modification time and size in hex,
/// e.g., `"17a3c5e9b2d04f00-1f4"`
pub fn generate_etag(len: u64, modified: Option<SystemTime>) -> String {
    let nanos = modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos());
    format!("\"{nanos:x}-{len:x}\"")
}

/// Format a timestamp as an HTTP date
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}

/// Parse any of the three HTTP date formats
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    [IMF_FIXDATE, RFC850_DATE, ASCTIME_DATE]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Validators describing the current representation of a resource
#[derive(Debug, Clone)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<SystemTime>,
}

impl Validators {
    /// Modification time truncated to whole seconds, as HTTP dates carry it
    fn modified_secs(&self) -> Option<i64> {
        self.last_modified
            .map(|t| DateTime::<Utc>::from(t).timestamp())
    }

    pub fn last_modified_header(&self) -> Option<String> {
        self.last_modified.map(http_date)
    }
}

/// Conditional request headers of one request
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_unmodified_since: Option<String>,
    pub if_range: Option<String>,
}

impl Conditions {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            if_match: get("if-match"),
            if_none_match: get("if-none-match"),
            if_modified_since: get("if-modified-since"),
            if_unmodified_since: get("if-unmodified-since"),
            if_range: get("if-range"),
        }
    }
}

/// Outcome of evaluating preconditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Serve the resource normally
    Proceed,
    /// Client copy is current (304)
    NotModified,
    /// A required precondition does not hold (412)
    Failed,
}

/// Evaluate preconditions for a GET or HEAD request
pub fn evaluate(conditions: &Conditions, validators: &Validators) -> Precondition {
    let etag = validators.etag.as_deref();

    match conditions.if_match.as_deref() {
        Some(if_match) => {
            if !etag.is_some_and(|tag| etag_list_matches(if_match, tag, false)) {
                return Precondition::Failed;
            }
        }
        None => {
            if let (Some(since), Some(modified)) = (
                conditions
                    .if_unmodified_since
                    .as_deref()
                    .and_then(parse_http_date),
                validators.modified_secs(),
            ) {
                if modified > since.timestamp() {
                    return Precondition::Failed;
                }
            }
        }
    }

    match conditions.if_none_match.as_deref() {
        Some(if_none_match) => {
            if etag.is_some_and(|tag| etag_list_matches(if_none_match, tag, true)) {
                return Precondition::NotModified;
            }
        }
        None => {
            if let (Some(since), Some(modified)) = (
                conditions
                    .if_modified_since
                    .as_deref()
                    .and_then(parse_http_date),
                validators.modified_secs(),
            ) {
                if modified <= since.timestamp() {
                    return Precondition::NotModified;
                }
            }
        }
    }

    Precondition::Proceed
}

/// Whether a `Range` header may be honoured given the request's `If-Range`
pub fn range_allowed(conditions: &Conditions, validators: &Validators) -> bool {
    let Some(if_range) = conditions.if_range.as_deref().map(str::trim) else {
        return true;
    };

    if if_range.starts_with('"') || if_range.starts_with("W/") {
        // Only a strong validator can guard a range
        return !if_range.starts_with("W/")
            && validators.etag.as_deref() == Some(if_range);
    }

    match (parse_http_date(if_range), validators.modified_secs()) {
        (Some(date), Some(modified)) => date.timestamp() == modified,
        _ => false,
    }
}

/// Check if a client's `ETag` list matches the server's `ETag`
///
/// Supports single tags, comma separated lists and the `*` wildcard.
/// `weak` selects weak comparison (`W/` prefixes ignored).
pub fn etag_list_matches(header: &str, etag: &str, weak: bool) -> bool {
    let normalize = |tag: &str| -> Option<String> {
        match tag.strip_prefix("W/") {
            Some(stripped) if weak => Some(stripped.to_string()),
            Some(_) => None,
            None => Some(tag.to_string()),
        }
    };
    let Some(ours) = normalize(etag) else {
        return false;
    };

    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || normalize(candidate).is_some_and(|theirs| theirs == ours)
    })
}
