//! Field parsing helpers for inspection CSV rows.
//!
//! The feed stores every column as text. Blank and malformed values in
//! optional columns load as `None` rather than failing the whole dataset.

use chrono::{NaiveDate, NaiveDateTime};

/// Parses a date in the feed's `MM/DD/YYYY` format, falling back to
/// ISO-8601 dates and datetimes.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.date());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%m/%d/%Y %I:%M:%S %p") {
        return Some(naive.date());
    }
    None
}

/// Parses an inspection score. Returns `None` if blank, non-numeric or NaN.
#[must_use]
pub fn parse_score(s: &str) -> Option<f64> {
    let value = s.trim().parse::<f64>().ok()?;
    if value.is_nan() {
        return None;
    }
    Some(value)
}

/// Trims a text field, mapping blank values to `None`.
#[must_use]
pub fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
