//! Display formatting for dates coming off the backend.
//!
//! The backend emits ISO dates (`2024-03-07`) for timeline events and metric
//! points, and ISO datetimes for a few other records. The dashboard shows all
//! of them as `dd/mm/yy`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Output format used everywhere a date is shown.
pub const DISPLAY_FORMAT: &str = "%d/%m/%y";

/// Naive datetime layouts accepted in addition to plain dates and RFC 3339.
const DATETIME_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Format a backend date string for display.
///
/// Returns the input (trimmed) unchanged when it cannot be parsed, so a bad
/// date never blanks out the row it belongs to. Already-formatted values
/// round-trip: `format_date(&format_date(s)) == format_date(s)`.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => raw.trim().to_string(),
    }
}

/// Parse the calendar date out of any of the accepted layouts.
///
/// Timestamps carrying an offset keep the date as written; no conversion to
/// local time is applied.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(stamp.date());
        }
    }

    NaiveDate::parse_from_str(raw, DISPLAY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_date() {
        assert_eq!(format_date("2024-03-07"), "07/03/24");
        assert_eq!(format_date("2025-12-31"), "31/12/25");
    }

    #[test]
    fn formats_datetimes() {
        assert_eq!(format_date("2024-03-07T09:15:00"), "07/03/24");
        assert_eq!(format_date("2024-03-07T09:15:00.123456"), "07/03/24");
        assert_eq!(format_date("2024-03-07 23:59:59"), "07/03/24");
        assert_eq!(format_date("2024-03-07T23:30:00+05:30"), "07/03/24");
    }

    #[test]
    fn idempotent_on_display_form() {
        let once = format_date("2024-03-07");
        assert_eq!(format_date(&once), once);
    }

    #[test]
    fn unparseable_input_is_kept() {
        assert_eq!(format_date("  sometime soon "), "sometime soon");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(parse_date("2024-02-30"), None);
    }
}
