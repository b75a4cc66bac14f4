//! Date resolution for ledger and work-log cells.
//!
//! Ledger dates are fully qualified (`MM-DD-YY`). Work-log dates are bare
//! `M/D`, and the year is inferred from a reference date: the log only ever
//! records recent work, so a month/day that lies beyond "today + lookahead"
//! belongs to the previous year.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::ReconError;

/// Layout ledger date cells are rendered in.
pub const LEDGER_DATE_FORMAT: &str = "%m-%d-%y";

/// Layout work-log date cells are rendered in.
pub const LOG_DATE_FORMAT: &str = "%-m/%-d";

/// Resolve a date cell to a calendar date.
///
/// Fully qualified dates parse directly; `M/D` dates get a year from
/// [`infer_year`]. Anything else is an error.
pub fn resolve_date(text: &str, today: NaiveDate, lookahead_days: u32) -> Result<NaiveDate, ReconError> {
    let text = text.trim();
    let invalid = || ReconError::DateParse { value: text.to_string() };

    if let Some(date) = parse_full_date(text) {
        return Ok(date);
    }

    let (month, day) = parse_month_day(text).ok_or_else(invalid)?;
    infer_year(month, day, today, lookahead_days).ok_or_else(invalid)
}

/// Parse `MM-DD-YY`, also accepting a four-digit year.
pub fn parse_full_date(text: &str) -> Option<NaiveDate> {
    let year = text.rsplit('-').next()?;
    let format = if year.len() == 4 { "%m-%d-%Y" } else { LEDGER_DATE_FORMAT };
    NaiveDate::parse_from_str(text, format).ok()
}

/// Split a bare `M/D` into its numeric parts. Range is not checked here.
pub fn parse_month_day(text: &str) -> Option<(u32, u32)> {
    let (month, day) = text.split_once('/')?;
    Some((month.trim().parse().ok()?, day.trim().parse().ok()?))
}

/// Pick the year for a month/day.
///
/// The anchor is `today + lookahead_days`. A month/day on or before the
/// anchor's month/day lands in today's year; a later one lands in the year
/// before the anchor's. Near the end of December the anchor has already
/// rolled into the next year, so early-January dates stay in today's year
/// and December dates resolve to today's year as well.
///
/// Returns `None` when the month/day does not exist in the chosen year.
pub fn infer_year(month: u32, day: u32, today: NaiveDate, lookahead_days: u32) -> Option<NaiveDate> {
    let anchor = today.checked_add_days(Days::new(u64::from(lookahead_days)))?;
    let year = if (month, day) <= (anchor.month(), anchor.day()) {
        today.year()
    } else {
        anchor.year() - 1
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn full_dates_parse_directly() {
        let today = date("2023-06-20");
        assert_eq!(resolve_date("06-01-23", today, 7).unwrap(), date("2023-06-01"));
        assert_eq!(resolve_date("6-1-23", today, 7).unwrap(), date("2023-06-01"));
        assert_eq!(resolve_date("12-31-2022", today, 7).unwrap(), date("2022-12-31"));
    }

    #[test]
    fn full_dates_ignore_reference_date() {
        assert_eq!(
            resolve_date("01-05-21", date("2030-12-30"), 7).unwrap(),
            date("2021-01-05")
        );
    }

    #[test]
    fn recent_month_day_is_current_year() {
        let today = date("2023-06-20");
        assert_eq!(resolve_date("6/18", today, 7).unwrap(), date("2023-06-18"));
        assert_eq!(resolve_date("1/3", today, 7).unwrap(), date("2023-01-03"));
    }

    #[test]
    fn within_lookahead_is_current_year() {
        let today = date("2023-06-20");
        // Anchor is 6/27.
        assert_eq!(resolve_date("6/27", today, 7).unwrap(), date("2023-06-27"));
        assert_eq!(resolve_date("6/22", today, 7).unwrap(), date("2023-06-22"));
    }

    #[test]
    fn beyond_lookahead_is_previous_year() {
        let today = date("2023-06-20");
        assert_eq!(resolve_date("6/28", today, 7).unwrap(), date("2022-06-28"));
        assert_eq!(resolve_date("12/15", today, 7).unwrap(), date("2022-12-15"));
    }

    #[test]
    fn year_end_rollover() {
        let today = date("2023-12-28");
        // Anchor is 2024-01-04.
        assert_eq!(resolve_date("01/02", today, 7).unwrap(), date("2023-01-02"));
        assert_eq!(resolve_date("1/4", today, 7).unwrap(), date("2023-01-04"));
        assert_eq!(resolve_date("12/20", today, 7).unwrap(), date("2023-12-20"));
        assert_eq!(resolve_date("12/28", today, 7).unwrap(), date("2023-12-28"));
        assert_eq!(resolve_date("1/5", today, 7).unwrap(), date("2023-01-05"));
    }

    #[test]
    fn early_january_resolves_december_to_last_year() {
        let today = date("2024-01-03");
        assert_eq!(resolve_date("12/29", today, 7).unwrap(), date("2023-12-29"));
        assert_eq!(resolve_date("1/2", today, 7).unwrap(), date("2024-01-02"));
    }

    #[test]
    fn zero_lookahead() {
        let today = date("2023-06-20");
        assert_eq!(resolve_date("6/20", today, 0).unwrap(), date("2023-06-20"));
        assert_eq!(resolve_date("6/21", today, 0).unwrap(), date("2022-06-21"));
    }

    #[test]
    fn impossible_dates_are_errors() {
        let today = date("2023-06-20");
        assert!(matches!(
            resolve_date("13/45", today, 7),
            Err(ReconError::DateParse { .. })
        ));
        // 2023 is not a leap year.
        assert!(resolve_date("2/29", today, 7).is_err());
        assert!(resolve_date("02-30-23", today, 7).is_err());
        assert!(resolve_date("June 1", today, 7).is_err());
    }

    #[test]
    fn leap_day_in_leap_year() {
        assert_eq!(
            resolve_date("2/29", date("2024-03-10"), 7).unwrap(),
            date("2024-02-29")
        );
    }
}
