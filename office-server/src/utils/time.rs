//! Time helpers in the business timezone
//!
//! Handlers convert dates to Unix millis here; repositories only see `i64`
//! millis or `NaiveDate`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a wall-clock time (HH:MM)
pub fn parse_hhmm(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {}, expected HH:MM", value)))
}

/// Local calendar day of an instant
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// Today in the business timezone
pub fn local_today(tz: Tz) -> NaiveDate {
    local_date(Utc::now(), tz)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Date + wall-clock time → Unix millis (business timezone)
///
/// DST gap fallback: a local time that does not exist is read as UTC.
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of day (00:00:00) → Unix millis
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_time_to_millis(date, NaiveTime::MIN, tz)
}

/// End of day → next day's 00:00:00 in Unix millis
///
/// Callers compare with `< end`.
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// Named date filter used by listing endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    Day(NaiveDate),
}

impl DateFilter {
    /// `today`, `yesterday`, `thisWeek`, `thisMonth` or `YYYY-MM-DD`
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "thisWeek" => Ok(Self::ThisWeek),
            "thisMonth" => Ok(Self::ThisMonth),
            other => parse_date(other).map(Self::Day),
        }
    }

    /// Inclusive first day and exclusive end day
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let next = |d: NaiveDate| d + Duration::days(1);
        match *self {
            Self::Today => (today, next(today)),
            Self::Yesterday => (today - Duration::days(1), today),
            Self::ThisWeek => {
                let monday =
                    today - Duration::days(today.weekday().num_days_from_monday() as i64);
                (monday, monday + Duration::days(7))
            }
            Self::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                let next_month = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
                };
                (first, next_month.unwrap_or(first))
            }
            Self::Day(day) => (day, next(day)),
        }
    }

    /// Same window as Unix millis, `[start, end)`
    pub fn millis_range(&self, today: NaiveDate, tz: Tz) -> (i64, i64) {
        let (start, end) = self.date_range(today);
        (day_start_millis(start, tz), day_start_millis(end, tz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(d(2024, 1, 6)));
        assert!(is_weekend(d(2024, 1, 7)));
        assert!(!is_weekend(d(2024, 1, 8)));
    }

    #[test]
    fn this_week_starts_on_monday() {
        // Wednesday
        let (start, end) = DateFilter::ThisWeek.date_range(d(2024, 1, 10));
        assert_eq!(start, d(2024, 1, 8));
        assert_eq!(end, d(2024, 1, 15));
    }

    #[test]
    fn this_month_rolls_over_december() {
        let (start, end) = DateFilter::ThisMonth.date_range(d(2023, 12, 20));
        assert_eq!(start, d(2023, 12, 1));
        assert_eq!(end, d(2024, 1, 1));
    }

    #[test]
    fn parse_accepts_named_and_explicit_days() {
        assert_eq!(DateFilter::parse("yesterday").unwrap(), DateFilter::Yesterday);
        assert_eq!(
            DateFilter::parse("2024-02-29").unwrap(),
            DateFilter::Day(d(2024, 2, 29))
        );
        assert!(DateFilter::parse("lastYear").is_err());
    }

    #[test]
    fn day_bounds_follow_timezone() {
        let tz: Tz = "Asia/Kathmandu".parse().unwrap();
        let start = day_start_millis(d(2024, 1, 1), tz);
        let end = day_end_millis(d(2024, 1, 1), tz);
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
        // +05:45
        assert_eq!(start, 1_704_067_200_000 - (5 * 60 + 45) * 60 * 1000);
    }

    #[test]
    fn hhmm_parsing() {
        assert_eq!(parse_hhmm("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_hhmm("9h30").is_err());
    }
}
