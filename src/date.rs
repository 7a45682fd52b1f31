//! Conversions between the date picker's display format and ISO dates.
//!
//! The date picker shows dates as `dd.mm.yyyy` while the backend expects
//! `yyyy-mm-dd`.

use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

const DISPLAY_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[day].[month].[year]");
const ISO_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const MONTH_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[month]/[year]");

/// Parse a date picker value such as "01.01.2024".
///
/// Returns `None` for empty or malformed input.
pub fn parse_display_date(input: &str) -> Option<Date> {
    Date::parse(input.trim(), DISPLAY_FORMAT).ok()
}

/// Parse an ISO date such as "2024-01-01".
pub fn parse_iso_date(input: &str) -> Option<Date> {
    Date::parse(input.trim(), ISO_FORMAT).ok()
}

/// Parse a date given in either the display or the ISO format.
pub fn parse_any_date(input: &str) -> Option<Date> {
    parse_display_date(input).or_else(|| parse_iso_date(input))
}

/// Format `date` as "dd.mm.yyyy".
pub fn to_display(date: Date) -> String {
    date.format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Format `date` as "yyyy-mm-dd".
pub fn to_iso(date: Date) -> String {
    date.format(ISO_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Convert a date picker value to its ISO form, e.g. "01.02.2024" to "2024-02-01".
pub fn display_to_iso(input: &str) -> Option<String> {
    parse_display_date(input).map(to_iso)
}

/// Today's date in the server's local time zone, falling back to UTC.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// The first day of the month `date` falls in.
pub fn first_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The first day of the month after `date`'s month.
pub fn next_month(date: Date) -> Option<Date> {
    let first = first_of_month(date);

    first
        .replace_month(first.month().next())
        .ok()
        .and_then(|next| {
            if next.month() == time::Month::January {
                next.replace_year(next.year() + 1).ok()
            } else {
                Some(next)
            }
        })
}

/// The first day of every month from `from`'s month up to and including `to`'s month.
pub fn months_between(from: Date, to: Date) -> Vec<Date> {
    let end = first_of_month(to);
    let mut months = Vec::new();
    let mut current = Some(first_of_month(from));

    while let Some(month) = current.filter(|month| *month <= end) {
        months.push(month);
        current = next_month(month);
    }

    months
}

/// Format the month of `date` as "mm/yyyy".
pub fn to_month_display(date: Date) -> String {
    date.format(MONTH_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}
