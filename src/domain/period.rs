//! Report periods
//!
//! Parsing and bounds for the calendar windows reports are computed over.
//! Every window is a closed range of UTC calendar dates.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// Longest range a cash flow report may span
pub const MAX_RANGE_DAYS: i64 = 365;

pub const DEFAULT_TREND_MONTHS: u32 = 12;
pub const MAX_TREND_MONTHS: u32 = 60;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query parameter validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("Invalid month parameter. Must be between 1 and 12")]
    InvalidMonth,

    #[error("Invalid year parameter. Must be between 1900 and 2100")]
    InvalidYear,

    #[error("Invalid months parameter. Must be between 1 and 60")]
    InvalidMonths,

    #[error("Invalid {0} format. Use YYYY-MM-DD")]
    InvalidDate(&'static str),

    #[error("end_date must be after start_date")]
    EndBeforeStart,

    #[error("Date range cannot exceed 365 days")]
    RangeTooLong,
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Resolve `month`/`year` query values, each defaulting to the month of `today`.
    pub fn from_query(
        month: Option<&str>,
        year: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, PeriodError> {
        let current = Self::containing(today);

        let month = match non_blank(month) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or(PeriodError::InvalidMonth)?,
            None => current.month,
        };

        let year = match non_blank(year) {
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .filter(|y| (1900..=2100).contains(y))
                .ok_or(PeriodError::InvalidYear)?,
            None => current.year,
        };

        Ok(Self { year, month })
    }

    pub fn first_day(&self) -> NaiveDate {
        // Month and year are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    pub fn as_range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }
}

/// Closed range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Resolve `start_date`/`end_date` query values for a cash flow report.
    ///
    /// Missing bounds default to the first and last day of the month of `today`.
    pub fn from_query(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, PeriodError> {
        let month = YearMonth::containing(today);

        let start = match non_blank(start) {
            Some(raw) => parse_date(raw, "start_date")?,
            None => month.first_day(),
        };
        let end = match non_blank(end) {
            Some(raw) => parse_date(raw, "end_date")?,
            None => month.last_day(),
        };

        if end < start {
            return Err(PeriodError::EndBeforeStart);
        }
        if (end - start).num_days() > MAX_RANGE_DAYS {
            return Err(PeriodError::RangeTooLong);
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Resolve the `months` query value of a trends report.
pub fn trend_months(months: Option<&str>) -> Result<u32, PeriodError> {
    match non_blank(months) {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=MAX_TREND_MONTHS).contains(m))
            .ok_or(PeriodError::InvalidMonths),
        None => Ok(DEFAULT_TREND_MONTHS),
    }
}

/// First date of the trends window, `months` months before `today`.
pub fn trend_window_start(today: NaiveDate, months: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Parse a `YYYY-MM-DD` value, naming `field` in the error.
pub fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate, PeriodError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| PeriodError::InvalidDate(field))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_defaults_to_today() {
        let period = YearMonth::from_query(None, None, date(2024, 3, 15)).unwrap();
        assert_eq!(period, YearMonth { year: 2024, month: 3 });

        let period = YearMonth::from_query(Some(""), Some("2023"), date(2024, 3, 15)).unwrap();
        assert_eq!(period, YearMonth { year: 2023, month: 3 });
    }

    #[test]
    fn test_month_bounds() {
        let today = date(2024, 3, 15);
        assert_eq!(
            YearMonth::from_query(Some("13"), None, today),
            Err(PeriodError::InvalidMonth)
        );
        assert_eq!(
            YearMonth::from_query(Some("0"), None, today),
            Err(PeriodError::InvalidMonth)
        );
        assert_eq!(
            YearMonth::from_query(Some("march"), None, today),
            Err(PeriodError::InvalidMonth)
        );
        assert_eq!(
            YearMonth::from_query(Some("12"), Some("1899"), today),
            Err(PeriodError::InvalidYear)
        );
        assert!(YearMonth::from_query(Some("1"), Some("2100"), today).is_ok());
    }

    #[test]
    fn test_month_last_day() {
        assert_eq!(YearMonth { year: 2024, month: 2 }.last_day(), date(2024, 2, 29));
        assert_eq!(YearMonth { year: 2023, month: 2 }.last_day(), date(2023, 2, 28));
        assert_eq!(YearMonth { year: 2024, month: 12 }.last_day(), date(2024, 12, 31));
    }

    #[test]
    fn test_range_defaults_to_current_month() {
        let range = DateRange::from_query(None, None, date(2024, 4, 10)).unwrap();
        assert_eq!(range.start, date(2024, 4, 1));
        assert_eq!(range.end, date(2024, 4, 30));
    }

    #[test]
    fn test_range_validation() {
        let today = date(2024, 4, 10);
        assert_eq!(
            DateRange::from_query(Some("2024/01/01"), None, today),
            Err(PeriodError::InvalidDate("start_date"))
        );
        assert_eq!(
            DateRange::from_query(Some("2024-01-01"), Some("tomorrow"), today),
            Err(PeriodError::InvalidDate("end_date"))
        );
        assert_eq!(
            DateRange::from_query(Some("2024-02-01"), Some("2024-01-01"), today),
            Err(PeriodError::EndBeforeStart)
        );
        assert_eq!(
            DateRange::from_query(Some("2023-01-01"), Some("2024-01-02"), today),
            Err(PeriodError::RangeTooLong)
        );
        assert!(DateRange::from_query(Some("2023-01-01"), Some("2024-01-01"), today).is_ok());
    }

    #[test]
    fn test_invalid_date_message_names_field() {
        assert_eq!(
            PeriodError::InvalidDate("start_date").to_string(),
            "Invalid start_date format. Use YYYY-MM-DD"
        );
    }

    #[test]
    fn test_trend_months() {
        assert_eq!(trend_months(None), Ok(12));
        assert_eq!(trend_months(Some("60")), Ok(60));
        assert_eq!(trend_months(Some("0")), Err(PeriodError::InvalidMonths));
        assert_eq!(trend_months(Some("61")), Err(PeriodError::InvalidMonths));
        assert_eq!(trend_window_start(date(2024, 3, 31), 1), date(2024, 2, 29));
    }
}
