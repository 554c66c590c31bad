//! Publication-date signals for grounding sources.
//!
//! Two kinds of signal are recognised: explicit date fields on a chunk
//! (`publishedAt`, `lastModified`, ...) and dates embedded in the source URI
//! or title (`/2024/05/17/`, `March 3, 2024`). A signal that does not
//! resolve to a real calendar date yields `None`; nothing is ever inferred.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};

/// Explicit date fields, most specific first.
const DATE_KEYS: &[&str] = &[
    "published_at",
    "publishedAt",
    "publishDate",
    "publicationDate",
    "lastModified",
    "last_modified",
    "date",
];

#[derive(Debug, Clone, Copy)]
enum EmbeddedPattern {
    YearMonthDay,
    YearMonth,
    MonthNameDayYear,
}

/// Read the first explicit date field on `obj` that parses.
pub fn explicit_date(obj: &Map<String, Value>) -> Option<DateTime<Utc>> {
    DATE_KEYS.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) => parse_date_hint(s),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    })
}

/// Parse a standalone date string: RFC 3339, RFC 2822 (HTTP `Last-Modified`),
/// a bare `YYYY-MM-DD`, or a zone-less `YYYY-MM-DDTHH:MM:SS` taken as UTC.
pub fn parse_date_hint(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(start_of_day)
}

/// Scan free text (typically `"{uri} {title}"`) for an embedded date.
pub fn embedded_date(text: &str) -> Option<DateTime<Utc>> {
    let patterns = [
        (
            r"\b((?:19|20)\d{2})[/-](\d{1,2})[/-](\d{1,2})\b",
            EmbeddedPattern::YearMonthDay,
        ),
        (
            r"\b((?:19|20)\d{2})[/-](\d{1,2})\b",
            EmbeddedPattern::YearMonth,
        ),
        (
            r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+((?:19|20)\d{2})\b",
            EmbeddedPattern::MonthNameDayYear,
        ),
    ];

    for (pattern, kind) in patterns.iter() {
        if let Ok(re) = Regex::new(pattern) {
            // Later matches can still be valid when an earlier one is not
            // a real date (e.g. "2024-13-40" ahead of "2024-05-01").
            for caps in re.captures_iter(text) {
                let parsed = match kind {
                    EmbeddedPattern::YearMonthDay => ymd(&caps[1], &caps[2], &caps[3]),
                    EmbeddedPattern::YearMonth => ymd(&caps[1], &caps[2], "1"),
                    EmbeddedPattern::MonthNameDayYear => {
                        month_number(&caps[1]).and_then(|m| ymd(&caps[3], &m.to_string(), &caps[2]))
                    }
                };
                if parsed.is_some() {
                    return parsed;
                }
            }
        }
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    start_of_day(date)
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
