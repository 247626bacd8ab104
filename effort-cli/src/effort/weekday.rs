//! Day-of-week filtering for sheets labelled with a date
//!
//! Sheets such as `"Week 2024-03-04"` carry a `YYYY-MM-DD` token. The first
//! ten-character token containing a dash decides the sheet's weekday; if it
//! is not a valid date the sheet has none.

use chrono::{Datelike, NaiveDate, Weekday};

use super::AggregatedTable;

/// Weekday of the first date-shaped token in a sheet label
pub fn sheet_weekday(sheet: &str) -> Option<Weekday> {
    let candidate = sheet
        .split_whitespace()
        .find(|part| part.len() == 10 && part.contains('-'))?;
    NaiveDate::parse_from_str(candidate, "%Y-%m-%d")
        .ok()
        .map(|date| date.weekday())
}

/// Weekday for a 0-based index where 0 is Monday
pub fn weekday_from_index(index: u32) -> Option<Weekday> {
    u8::try_from(index)
        .ok()
        .and_then(|i| Weekday::try_from(i).ok())
}

/// Full English day name, e.g. "Monday"
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl AggregatedTable {
    /// Rows whose sheet label dates to `day`
    pub fn filter_weekday(&self, day: Weekday) -> Self {
        self.filter(|row| sheet_weekday(&row.sheet) == Some(day))
    }
}
