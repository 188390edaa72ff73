use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::{OutlayError, Result};

/// Closed interval of whole days: both `start` and `end` are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(OutlayError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// Build from optional `--from`/`--to` bounds; both or neither.
    pub fn from_bounds(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Option<Self>> {
        match (from, to) {
            (Some(from), Some(to)) => Self::new(from, to).map(Some),
            (Some(_), None) => Err(OutlayError::InvalidRange(
                "--from requires --to (both date boundaries must be specified)".to_string(),
            )),
            (None, Some(_)) => Err(OutlayError::InvalidRange(
                "--to requires --from (both date boundaries must be specified)".to_string(),
            )),
            (None, None) => Ok(None),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

/// Named date-range shorthand, resolved against "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    /// ISO week, Monday through Sunday.
    Week,
    Month,
    Quarter,
    Year,
    Custom(DateRange),
}

impl Period {
    pub fn range(&self, today: NaiveDate) -> DateRange {
        match self {
            Period::Today => DateRange::day(today),
            Period::Week => {
                let back = today.weekday().num_days_from_monday() as u64;
                let start = today - Days::new(back);
                DateRange { start, end: start + Days::new(6) }
            }
            Period::Month => YearMonth::from_date(today).range(),
            Period::Quarter => {
                let first_month = (today.month0() / 3) * 3 + 1;
                let start = first_of_month(today.year(), first_month);
                DateRange { start, end: last_day(start, 3) }
            }
            Period::Year => {
                let start = first_of_month(today.year(), 1);
                DateRange { start, end: last_day(start, 12) }
            }
            Period::Custom(range) => *range,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
            Period::Custom(_) => "custom",
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Last day of the span of `months` months beginning at `start`.
fn last_day(start: NaiveDate, months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(months))
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// A calendar month, written `YYYY-MM`. `month` is one-based here; budgets
/// store the zero-based form returned by [`YearMonth::month0`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn month0(&self) -> u32 {
        self.month - 1
    }

    pub fn first_day(&self) -> NaiveDate {
        first_of_month(self.year, self.month)
    }

    pub fn range(&self) -> DateRange {
        let start = self.first_day();
        DateRange { start, end: last_day(start, 1) }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// The `count` months ending at (and including) `self`, oldest first.
    pub fn trailing(&self, count: usize) -> Vec<YearMonth> {
        let mut months = Vec::with_capacity(count);
        let mut cursor = *self;
        for _ in 0..count {
            months.push(cursor);
            cursor = cursor.previous();
        }
        months.reverse();
        months
    }

    /// "October 2026"
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month '{0}' (expected YYYY-MM)")]
pub struct ParseYearMonthError(pub String);

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParseYearMonthError(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(err)?;
        let year: i32 = y.parse().map_err(|_| err())?;
        let month: u32 = m.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(err());
        }
        Ok(Self { year, month })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_range_is_closed_on_both_ends() {
        let r = DateRange::new(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
        assert!(r.contains(d(2025, 1, 1)));
        assert!(r.contains(d(2025, 1, 31)));
        assert!(!r.contains(d(2025, 2, 1)));
        assert!(!r.contains(d(2024, 12, 31)));
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(DateRange::new(d(2025, 2, 1), d(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_from_bounds_requires_both() {
        let msg = DateRange::from_bounds(Some(d(2025, 1, 1)), None)
            .unwrap_err()
            .to_string();
        assert!(msg.contains("--from requires --to"), "got: {msg}");
        let msg = DateRange::from_bounds(None, Some(d(2025, 1, 1)))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("--to requires --from"), "got: {msg}");
        assert_eq!(DateRange::from_bounds(None, None).unwrap(), None);
    }

    #[test]
    fn test_week_runs_monday_to_sunday() {
        // 2026-10-16 is a Friday
        let r = Period::Week.range(d(2026, 10, 16));
        assert_eq!(r.start(), d(2026, 10, 12));
        assert_eq!(r.end(), d(2026, 10, 18));
    }

    #[test]
    fn test_month_quarter_year_ranges() {
        let today = d(2024, 2, 10);
        let m = Period::Month.range(today);
        assert_eq!((m.start(), m.end()), (d(2024, 2, 1), d(2024, 2, 29)));
        let q = Period::Quarter.range(d(2025, 11, 3));
        assert_eq!((q.start(), q.end()), (d(2025, 10, 1), d(2025, 12, 31)));
        let y = Period::Year.range(today);
        assert_eq!((y.start(), y.end()), (d(2024, 1, 1), d(2024, 12, 31)));
        assert_eq!(Period::Today.range(today), DateRange::day(today));
    }

    #[test]
    fn test_year_month_parse_and_previous() {
        let ym: YearMonth = "2025-01".parse().unwrap();
        assert_eq!(ym.month0(), 0);
        assert_eq!(ym.previous(), YearMonth { year: 2024, month: 12 });
        assert_eq!(ym.to_string(), "2025-01");
        assert_eq!(ym.label(), "January 2025");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("202501".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_trailing_months_oldest_first() {
        let ym = YearMonth { year: 2025, month: 2 };
        let months = ym.trailing(3);
        assert_eq!(
            months,
            vec![
                YearMonth { year: 2024, month: 12 },
                YearMonth { year: 2025, month: 1 },
                YearMonth { year: 2025, month: 2 },
            ]
        );
    }
}
