//! Editing a cleaner's list of unavailable dates.
//!
//! The list is stored remotely as an unordered array of date strings. Every
//! function here returns the complete list to write back; none of them
//! touch the network.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::calendar::{self, date_key, parse_date_key, DateRange};
use crate::error::Result;

/// Direction of an availability edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityChange {
    /// Add the dates to the unavailable list
    MarkUnavailable,
    /// Remove the dates from the unavailable list
    MarkAvailable,
}

impl AvailabilityChange {
    /// `true` means "mark unavailable", matching the checkbox in the UI
    pub fn from_unavailable_flag(unavailable: bool) -> Self {
        if unavailable {
            AvailabilityChange::MarkUnavailable
        } else {
            AvailabilityChange::MarkAvailable
        }
    }
}

/// Storage key of a list entry. Entries in the external format are
/// re-keyed; anything unparseable is kept verbatim.
fn entry_key(entry: &str) -> String {
    let entry = entry.trim();
    if let Ok(date) = parse_date_key(entry) {
        return date_key(date);
    }
    if let Ok(date) = calendar::parse_external_date(entry) {
        return date_key(date);
    }
    entry.to_string()
}

/// Normalize a stored list: keys re-formatted, duplicates dropped, first
/// occurrence order kept.
pub fn normalize(current: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    current
        .iter()
        .map(|e| entry_key(e))
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect()
}

/// Whether the date is in the unavailable list
pub fn is_unavailable(current: &[String], date: NaiveDate) -> bool {
    let key = date_key(date);
    current.iter().any(|e| entry_key(e) == key)
}

/// Apply a change for explicit dates
pub fn apply_dates(
    current: &[String],
    dates: &[NaiveDate],
    change: AvailabilityChange,
) -> Vec<String> {
    let mut result = normalize(current);
    let keys: Vec<String> = dates.iter().map(|d| date_key(*d)).collect();

    match change {
        AvailabilityChange::MarkUnavailable => {
            let mut present: HashSet<String> = result.iter().cloned().collect();
            for key in keys {
                if present.insert(key.clone()) {
                    result.push(key);
                }
            }
        }
        AvailabilityChange::MarkAvailable => {
            let remove: HashSet<String> = keys.into_iter().collect();
            result.retain(|k| !remove.contains(k));
        }
    }

    result
}

/// Apply a change over an inclusive range of dates
pub fn apply_date_range(
    current: &[String],
    range: DateRange,
    change: AvailabilityChange,
) -> Vec<String> {
    let dates: Vec<NaiveDate> = range.days().collect();
    apply_dates(current, &dates, change)
}

/// Apply a change over a range typed in the external day-month-year format.
///
/// Fails with a validation error when either date is malformed or the start
/// is after the end.
pub fn apply_range(
    current: &[String],
    start: &str,
    end: &str,
    change: AvailabilityChange,
) -> Result<Vec<String>> {
    let range = calendar::parse_external_range(start, end)?;
    Ok(apply_date_range(current, range, change))
}

/// Flip a single date
pub fn toggle_date(current: &[String], date: NaiveDate) -> Vec<String> {
    let change = if is_unavailable(current, date) {
        AvailabilityChange::MarkAvailable
    } else {
        AvailabilityChange::MarkUnavailable
    };
    apply_dates(current, &[date], change)
}
