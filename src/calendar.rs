//! Calendar helpers: month grids, date formats and date ranges.
//!
//! Two string formats are in play. Dates typed by people use the external
//! day-month-year format [`EXTERNAL_DATE_FORMAT`]; dates stored remotely
//! (task dates, availability lists) use the ISO key format
//! [`DATE_KEY_FORMAT`].
//!
//! Weeks start on Monday everywhere in this crate.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::{Error, Result};

/// Day-month-year format used for typed input and display
pub const EXTERNAL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Normalized format used for storage and lookups
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// First column of every calendar week
pub const WEEK_START: Weekday = Weekday::Mon;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One cell of a month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    /// The calendar date
    pub date: NaiveDate,
    /// Normalized date string (`YYYY-MM-DD`)
    pub key: String,
    /// Whether the date belongs to the requested month
    pub in_month: bool,
    /// Whether the date is "today"
    pub is_today: bool,
}

/// Seven consecutive days, Monday first
pub type Week = [DayCell; 7];

/// Inclusive range of dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::validation(format!(
                "The start date {} is after the end date {}",
                format_external(start),
                format_external(end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether the date falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date of the range, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Build the grid of weeks covering a month.
///
/// `month0` is zero-based (0 = January). The grid is padded with the tail of
/// the previous month and the head of the next one so that every row is a
/// full Monday-to-Sunday week.
pub fn month_matrix(year: i32, month0: u32, today: NaiveDate) -> Result<Vec<Week>> {
    let (first, last) = month_bounds(year, month0)?;

    let grid_start = week_start(first)?;
    let grid_end = week_start(last)?
        .checked_add_signed(Duration::days(6))
        .ok_or_else(|| out_of_range(last))?;
    let days = ((grid_end - grid_start).num_days() + 1) as usize;

    let cells: Vec<DayCell> = grid_start
        .iter_days()
        .take(days)
        .map(|date| DayCell {
            date,
            key: date_key(date),
            in_month: date.month0() == month0 && date.year() == year,
            is_today: date == today,
        })
        .collect();

    Ok(cells
        .chunks_exact(7)
        .map(|week| std::array::from_fn(|i| week[i].clone()))
        .collect())
}

fn out_of_range(date: NaiveDate) -> Error {
    Error::validation(format!(
        "The week of {} falls outside the supported calendar",
        date_key(date)
    ))
}

/// First and last day of a month
pub fn month_bounds(year: i32, month0: u32) -> Result<(NaiveDate, NaiveDate)> {
    if month0 > 11 {
        return Err(Error::validation(format!(
            "Month index {} is out of range (0-11)",
            month0
        )));
    }

    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .ok_or_else(|| Error::validation(format!("Year {} is out of range", year)))?;
    let next_first = if month0 == 11 {
        year.checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
    } else {
        NaiveDate::from_ymd_opt(year, month0 + 2, 1)
    }
    .ok_or_else(|| Error::validation(format!("Year {} is out of range", year)))?;

    let last = next_first
        .pred_opt()
        .ok_or_else(|| Error::validation(format!("Year {} is out of range", year)))?;
    Ok((first, last))
}

/// Human title for a month, e.g. "October 2026"
pub fn month_title(year: i32, month0: u32) -> String {
    match MONTH_NAMES.get(month0 as usize) {
        Some(name) => format!("{} {}", name, year),
        None => year.to_string(),
    }
}

/// Year and zero-based month after stepping `delta` months
pub fn shift_month(year: i32, month0: u32, delta: i32) -> (i32, u32) {
    let total = year * 12 + month0 as i32 + delta;
    (total.div_euclid(12), total.rem_euclid(12) as u32)
}

/// Monday of the week containing the date; fails when that Monday is
/// before the earliest representable date
pub fn week_start(date: NaiveDate) -> Result<NaiveDate> {
    let offset = date.weekday().num_days_from_monday();
    date.checked_sub_signed(Duration::days(offset as i64))
        .ok_or_else(|| out_of_range(date))
}

/// Monday-to-Sunday week containing the date
pub fn week_of(date: NaiveDate) -> Result<DateRange> {
    let start = week_start(date)?;
    let end = start
        .checked_add_signed(Duration::days(6))
        .ok_or_else(|| out_of_range(date))?;
    Ok(DateRange { start, end })
}

/// Normalized storage key for a date
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a normalized storage key
pub fn parse_date_key(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT)
        .map_err(|_| Error::validation(format!("Invalid date '{}', expected YYYY-MM-DD", key)))
}

/// Render a date in the external day-month-year format
pub fn format_external(date: NaiveDate) -> String {
    date.format(EXTERNAL_DATE_FORMAT).to_string()
}

/// Parse a date typed in the external day-month-year format
pub fn parse_external_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    // chrono accepts single-digit fields; the external format does not.
    let well_formed = input.len() == 10
        && input
            .char_indices()
            .all(|(i, c)| if i == 2 || i == 5 { c == '/' } else { c.is_ascii_digit() });

    if !well_formed {
        return Err(Error::validation(format!(
            "Invalid date '{}', expected DD/MM/YYYY",
            input
        )));
    }

    NaiveDate::parse_from_str(input, EXTERNAL_DATE_FORMAT).map_err(|_| {
        Error::validation(format!("Invalid date '{}', expected DD/MM/YYYY", input))
    })
}

/// Parse a pair of external dates into a validated range
pub fn parse_external_range(start: &str, end: &str) -> Result<DateRange> {
    let start = parse_external_date(start)?;
    let end = parse_external_date(end)?;
    DateRange::new(start, end)
}

/// Expand an inclusive range into every date it covers
pub fn expand_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    Ok(DateRange::new(start, end)?.days().collect())
}
