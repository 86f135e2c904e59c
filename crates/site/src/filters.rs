//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an ISO date as a long-form display date, e.g. "January 15, 2025".
///
/// Values that do not parse are passed through unchanged.
///
/// Usage in templates: `{{ post.date|display_date }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn display_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_display_date(&value.to_string()))
}

fn format_display_date(raw: &str) -> String {
    raw.parse::<NaiveDate>()
        .map_or_else(|_| raw.to_string(), |date| date.format("%B %-d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_formats_iso_dates() {
        assert_eq!(format_display_date("2025-01-15"), "January 15, 2025");
    }

    #[test]
    fn test_display_date_passes_through_garbage() {
        assert_eq!(format_display_date("soon"), "soon");
    }
}
