//! Calendar-month values exchanged as `MM-YYYY`.

use chrono::{Datelike, Days, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseMonthError {
    #[error("expected MM-YYYY (e.g. 07-2025), got {0:?}")]
    Format(String),
    #[error("month {0:02} is out of range 01-12")]
    OutOfRange(u32),
}

/// A calendar month, held as the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ParseMonthError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or(ParseMonthError::OutOfRange(month))
    }

    /// Month containing today's date in UTC.
    pub fn current() -> Self {
        Self::from(Utc::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Whole calendar months from `self` to `later`; negative when `later` is earlier.
    pub fn months_until(&self, later: YearMonth) -> i64 {
        i64::from(later.year() - self.year()) * 12 + i64::from(later.month())
            - i64::from(self.month())
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }
}

impl FromStr for YearMonth {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || ParseMonthError::Format(s.to_string());
        let (mm, yyyy) = s.trim().split_once('-').ok_or_else(format_err)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if mm.len() != 2 || yyyy.len() != 4 || !all_digits(mm) || !all_digits(yyyy) {
            return Err(format_err());
        }

        let month: u32 = mm.parse().map_err(|_| format_err())?;
        let year: i32 = yyyy.parse().map_err(|_| format_err())?;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}
