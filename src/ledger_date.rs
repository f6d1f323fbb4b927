//! Plain calendar dates for ledger entries.
//!
//! A [LedgerDate] is a year, month and day triple with no time component and
//! no timezone. Month arithmetic is done on the integers directly and keeps
//! the day number as-is, so advancing 31 January by one month gives the
//! nominal date 31 February rather than rolling over into March. Dates typed
//! in by users are checked against the real calendar with
//! [LedgerDate::calendar], while dates read back from storage only need a
//! month in 1-12 and a day in 1-31.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{Date, Month};

use crate::Error;

/// The largest year that still formats as four digits.
const MAX_YEAR: i32 = 9999;

/// A date on a ledger entry, formatted as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerDate {
    year: i32,
    month: u8,
    day: u8,
}

impl LedgerDate {
    /// Create a date with a month in 1-12 and a day in 1-31.
    ///
    /// The day is not checked against the length of the month, see
    /// [LedgerDate::calendar] for that.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if any component is out of range.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, Error> {
        if !(0..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
        {
            return Err(Error::InvalidDate(format!("{year:04}-{month:02}-{day:02}")));
        }

        Ok(Self { year, month, day })
    }

    /// Create a date from components the caller has already range checked.
    pub(crate) fn new_unchecked(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Create a date that must exist in the calendar.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if the date does not exist, e.g. 2023-02-29.
    pub fn calendar(year: i32, month: u8, day: u8) -> Result<Self, Error> {
        let date = Self::new(year, month, day)?;

        if date.is_calendar_date() {
            Ok(date)
        } else {
            Err(Error::InvalidDate(date.to_string()))
        }
    }

    /// Whether the date exists in the calendar.
    pub fn is_calendar_date(&self) -> bool {
        Month::try_from(self.month)
            .and_then(|month| Date::from_calendar_date(self.year, month, self.day))
            .is_ok()
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component, 1-12.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The day of the month, 1-31.
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Move the date forward by `months`, carrying into the year and keeping
    /// the day number unchanged.
    ///
    /// The result may be a nominal date such as 2024-02-31. Returns `None` if
    /// the result would fall after the year 9999.
    pub fn advance_months(self, months: u32) -> Option<Self> {
        let zero_based_month = i64::from(self.month - 1) + i64::from(months);
        let year = i32::try_from(i64::from(self.year) + zero_based_month / 12).ok()?;
        let month = u8::try_from(zero_based_month % 12 + 1).ok()?;

        (year <= MAX_YEAR).then_some(Self {
            year,
            month,
            day: self.day,
        })
    }
}

impl From<Date> for LedgerDate {
    fn from(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
            day: date.day(),
        }
    }
}

impl Display for LedgerDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for LedgerDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidDate(s.to_owned());

        let mut parts = s.trim().splitn(3, '-');
        let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }

        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        let day = day.parse().map_err(|_| invalid())?;

        Self::new(year, month, day).map_err(|_| invalid())
    }
}

impl Serialize for LedgerDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LedgerDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl ToSql for LedgerDate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for LedgerDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
