//! Resolves "today" in the server's configured timezone.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::{Error, ledger_date::LedgerDate};

/// Get the current UTC offset of a canonical timezone, e.g. "America/Sao_Paulo".
///
/// Returns `None` if the timezone name is not known.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in `canonical_timezone`.
///
/// Entries created without a date are dated with this, so the date must come
/// from the configured timezone and not the host clock's UTC date.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone name is not known.
pub fn today(canonical_timezone: &str) -> Result<LedgerDate, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;

    Ok(LedgerDate::from(OffsetDateTime::now_utc().to_offset(offset).date()))
}

#[cfg(test)]
mod tests {
    use crate::{Error, timezone::today};

    #[test]
    fn today_is_a_calendar_date() {
        let date = today("America/Sao_Paulo").expect("Could not get today's date");

        assert!(date.is_calendar_date());
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert_eq!(
            today("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()))
        );
    }
}
