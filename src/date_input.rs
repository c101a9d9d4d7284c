//! Parsing and display of the date formats used by forms and list filters.

use time::{Date, Month, format_description::BorrowedFormatItem, macros::format_description};

/// Day first with a four digit year, e.g. "31.01.2023".
const DAY_MONTH_YEAR: &[BorrowedFormatItem] =
    format_description!("[day padding:none].[month padding:none].[year]");

/// ISO 8601, e.g. "2023-01-31". Also what `<input type="date">` submits.
const ISO_DATE: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

const DISPLAY_DATE: &[BorrowedFormatItem] = format_description!("[day].[month].[year]");

/// Parse a date typed into the transaction form.
///
/// Accepts "31.01.2023", "31.01.23" and "2023-01-31". Two digit years from
/// 69 to 99 are read as 1969-1999, and 00 to 68 as 2000-2068.
pub fn parse_form_date(text: &str) -> Option<Date> {
    let text = text.trim();

    Date::parse(text, DAY_MONTH_YEAR)
        .ok()
        .or_else(|| parse_two_digit_year_date(text))
        .or_else(|| Date::parse(text, ISO_DATE).ok())
}

/// Parse a bound of the date range list filter, e.g. "31.01.2023".
pub fn parse_filter_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), DAY_MONTH_YEAR).ok()
}

/// Format a date for list pages, e.g. "31.01.2023".
pub fn format_display_date(date: Date) -> String {
    date.format(DISPLAY_DATE)
        .unwrap_or_else(|_| date.to_string())
}

fn parse_two_digit_year_date(text: &str) -> Option<Date> {
    let mut parts = text.split('.');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);

    if parts.next().is_some() || year.len() != 2 {
        return None;
    }

    let is_number = |part: &str| {
        !part.is_empty() && part.len() <= 2 && part.chars().all(|c| c.is_ascii_digit())
    };

    if !(is_number(day) && is_number(month) && is_number(year)) {
        return None;
    }

    let day: u8 = day.parse().ok()?;
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    let year: i32 = year.parse().ok()?;
    let year = if year >= 69 { 1900 + year } else { 2000 + year };

    Date::from_calendar_date(year, month, day).ok()
}
