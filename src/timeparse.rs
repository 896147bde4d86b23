//! Free-text time interpretation
//!
//! Accepts a handful of relative natural-language forms plus absolute
//! date/time strings, normalized to UTC. Naive inputs are taken as UTC; the
//! system runs on a single fixed zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Canonical absolute format, also used when rendering stored times.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render an instant in the canonical format.
pub fn format(ts: DateTime<Utc>) -> String {
    ts.format(CANONICAL_FORMAT).to_string()
}

/// Parse a free-text time expression against a reference instant.
///
/// Returns `None` when the text matches no known form. No range validation;
/// past instants are accepted.
pub fn parse(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // Absolute forms first: these are unambiguous regardless of `now`.
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, CANONICAL_FORMAT) {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M") {
        return Some(now.date_naive().and_time(time).and_utc());
    }

    let lower = text.to_lowercase();
    match lower.as_str() {
        "now" | "today" => return Some(now),
        "tomorrow" => return Some(now + Duration::days(1)),
        _ => {}
    }
    if let Some(rest) = lower.strip_prefix("today at ") {
        return clock(rest).map(|t| now.date_naive().and_time(t).and_utc());
    }
    if let Some(rest) = lower.strip_prefix("tomorrow at ") {
        let date = now.date_naive() + Duration::days(1);
        return clock(rest).map(|t| date.and_time(t).and_utc());
    }
    if let Some(rest) = lower.strip_prefix("in ") {
        return offset(rest).map(|d| now + d);
    }

    None
}

/// Clock expressions: "15:00", "7:30", "9"
fn clock(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    let (hour, minute) = match text.split_once(':') {
        Some((h, m)) => (h.parse().ok()?, m.parse().ok()?),
        None => (text.parse().ok()?, 0),
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Offset expressions: "2 hours", "1 day", "90 minutes"
fn offset(text: &str) -> Option<Duration> {
    let (amount, unit) = text.trim().split_once(' ')?;
    let amount: i64 = amount.parse().ok()?;
    match unit.trim().trim_end_matches('s') {
        "minute" | "min" => Some(Duration::minutes(amount)),
        "hour" | "hr" => Some(Duration::hours(amount)),
        "day" => Some(Duration::days(amount)),
        "week" => Some(Duration::weeks(amount)),
        _ => None,
    }
}
