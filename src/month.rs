//! Calendar month keys (`YYYY-MM`) used to bucket dreams into reports.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid month format. Use YYYY-MM")]
pub struct InvalidMonth;

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidMonth> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(InvalidMonth);
        }
        Ok(Self { year, month })
    }

    pub fn of(date: DateTime<Utc>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::of(Utc::now())
    }

    pub fn previous() -> Self {
        Self::current().months_back(1)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month `n` calendar months before this one.
    pub fn months_back(&self, n: u32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 - n as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Half-open UTC range `[start, end)` covering the whole month.
    pub fn range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = self.next();
        (
            Utc.from_utc_datetime(&self.first_day().and_hms_opt(0, 0, 0).unwrap_or_default()),
            Utc.from_utc_datetime(&next.first_day().and_hms_opt(0, 0, 0).unwrap_or_default()),
        )
    }

    fn next(&self) -> Self {
        let index = self.year * 12 + self.month as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(InvalidMonth);
        }
        let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
        if !digits(0..4) || !digits(5..7) {
            return Err(InvalidMonth);
        }
        let year = s[0..4].parse().map_err(|_| InvalidMonth)?;
        let month = s[5..7].parse().map_err(|_| InvalidMonth)?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = InvalidMonth;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Validator hook for request DTOs carrying a month string.
pub fn validate_month_key(value: &str) -> Result<(), validator::ValidationError> {
    value
        .parse::<MonthKey>()
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("month_format"))
}
