//! # Query Normalization Module
//!
//! Inbound queries arrive from two directions: structured search requests
//! and attribute maps decoded out of browse URIs. Both are normalized here
//! into one canonical shape that the rest of the engine can rely on:
//!
//! - every attribute maps to a non-empty list of string values
//!   (empty-valued keys are dropped),
//! - a `date` key never survives: parseable values are rewritten into
//!   `year`, unparseable ones are silently discarded.
//!
//! Normalization is a pure transform. The caller's map is consumed and a
//! fresh canonical map is returned; nothing is mutated in place, and
//! running the transform twice yields the same result.

use std::collections::BTreeMap;

/// An attribute map from field name to ordered values.
///
/// A `BTreeMap` keeps iteration order deterministic, which is what makes
/// URI encoding canonical: two semantically identical queries always
/// serialize to byte-identical URIs.
pub type Query = BTreeMap<String, Vec<String>>;

/// Normalize a raw query into its canonical form.
///
/// `None` passes through unchanged so that callers can distinguish
/// "no query" (browse everything) from "empty query".
///
/// # Examples
///
/// ```
/// use melodeon::query::{normalize, Query};
///
/// let mut raw = Query::new();
/// raw.insert("date".to_string(), vec!["2020-05-03".to_string()]);
/// let canonical = normalize(Some(raw)).unwrap();
/// assert_eq!(canonical.get("year"), Some(&vec!["2020".to_string()]));
/// assert!(!canonical.contains_key("date"));
/// ```
pub fn normalize(query: Option<Query>) -> Option<Query> {
    let query = query?;
    let mut canonical = Query::new();
    let mut years = Vec::new();

    for (key, values) in query {
        if values.is_empty() {
            log::trace!("Dropping empty-valued query key: {key}");
            continue;
        }
        if key == "date" {
            for value in &values {
                if let Some(year) = sanitize_year(value) {
                    years.push(year);
                }
            }
        } else {
            canonical.insert(key, values);
        }
    }

    // Clients send the date field as a full date, a bare year, or junk.
    // Only the entries that parse contribute to the year attribute.
    if !years.is_empty() {
        canonical.insert("year".to_string(), years);
    }

    Some(canonical)
}

/// Extract a year from a date-like value.
///
/// Accepts a bare year (`"2020"`) or an ISO date (`"2020-05-03"`).
/// Returns `None` for anything else; normalization never raises on bad
/// client input.
fn sanitize_year(datestr: &str) -> Option<String> {
    let datestr = datestr.trim();
    if let Ok(year) = datestr.parse::<u16>() {
        if year >= 1 && datestr.len() <= 4 {
            return Some(year.to_string());
        }
        return None;
    }

    let mut parts = datestr.splitn(3, '-');
    let year: u16 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if year >= 1 && (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month) {
        return Some(year.to_string());
    }
    None
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        _ => 0,
    }
}
