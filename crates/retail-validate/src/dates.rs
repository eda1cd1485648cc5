//! Calendar date parsing for sale dates.

use chrono::{DateTime, NaiveDate};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parse a sale date value.
///
/// Accepts plain dates in a few common shapes and full ISO-8601 datetimes
/// (only the date part is kept). Returns None for anything else.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('T') {
        return DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.date_naive())
            .ok();
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}
