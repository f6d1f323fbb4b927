//! Helpers for storing and rounding monetary amounts.
//!
//! Amounts are [Decimal]s so that sums are exact. SQLite has no decimal type,
//! so amounts are written as normalised TEXT and parsed on the way back out.

use rusqlite::{Row, types::Type};
use rust_decimal::{Decimal, RoundingStrategy};

/// The largest amount accepted for a single transaction or budget.
///
/// Sums of a month of amounts this size stay far inside [Decimal::MAX].
// 1_000_000_000_000 == 0xE8_D4A5_1000, split into 32-bit parts
// (`Decimal::new` is not a const fn).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Round `amount` to cents, with halves rounded away from zero.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The TEXT form used to store `amount`.
///
/// Trailing zeros are dropped so that equal amounts are stored identically.
pub fn to_sql_text(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Read a decimal amount stored as TEXT from column `index`.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    raw.parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}
