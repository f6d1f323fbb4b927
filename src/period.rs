//! The calendar month that summaries and the recurrence copier work on.

use serde::{Deserialize, Serialize};

use crate::{Error, ledger_date::LedgerDate};

/// A calendar month.
///
/// The month covers the days 1 to 31 regardless of its real length so that
/// nominal dates such as 2024-02-31, produced by month arithmetic, still fall
/// inside February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthPeriod {
    year: i32,
    month: u8,
}

impl MonthPeriod {
    /// Create a period for `month` (1-12) of `year`.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if the month is out of range or the
    /// year is outside of 1-9998.
    pub fn new(year: i32, month: u8) -> Result<Self, Error> {
        if !(1..=12).contains(&month) || !(1..=9998).contains(&year) {
            return Err(Error::InvalidPeriod(format!("{month}/{year}")));
        }

        Ok(Self { year, month })
    }

    /// The year of the period.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the period, 1-12.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The first day of the month.
    pub fn start(&self) -> LedgerDate {
        self.date_on(1)
    }

    /// Day 31 of the month, which may be a nominal date.
    pub fn end(&self) -> LedgerDate {
        self.date_on(31)
    }

    /// Whether `date` falls within the month.
    pub fn contains(&self, date: LedgerDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month formatted as `M/YYYY`, e.g. "3/2024".
    pub fn label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }

    fn date_on(&self, day: u8) -> LedgerDate {
        LedgerDate::new_unchecked(self.year, self.month, day)
    }
}

/// The month and year query parameters shared by several endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodParams {
    /// The month, 1-12.
    pub month: u8,
    /// The four digit year.
    pub year: i32,
}

impl TryFrom<PeriodParams> for MonthPeriod {
    type Error = Error;

    fn try_from(params: PeriodParams) -> Result<Self, Self::Error> {
        MonthPeriod::new(params.year, params.month)
    }
}
