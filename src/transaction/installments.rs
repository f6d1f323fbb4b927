//! Splits a purchase into monthly installments.
//!
//! A purchase of `total` over `N` installments becomes `N` ledger rows, one
//! per month starting at the base date. Every row gets the same rounded share
//! of the total, so the rows may add up to slightly more or less than the
//! total. The difference is at most half a cent per row and is left as is.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    category::{CategoryId, validate_category},
    kind::Kind,
    ledger_date::LedgerDate,
    money::round_to_cents,
    tenant::TenantId,
    transaction::{
        EntityType, Transaction, TransactionBuilder,
        core::{insert_transaction, validate_fields},
    },
};

/// A purchase to be recorded as one or more monthly rows.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentPlan {
    /// The total amount of the purchase.
    pub total: Decimal,
    /// How many monthly rows to create, at least 1.
    pub installments: i64,
    /// The date of the first row.
    pub base_date: LedgerDate,
    /// The description shared by every row.
    pub description: String,
    /// Income or expense.
    pub kind: Kind,
    /// The category shared by every row.
    pub category_id: Option<CategoryId>,
    /// Personal or business.
    pub entity_type: EntityType,
    /// Whether the rows are recurring bills.
    pub is_fixed: bool,
    /// The paid status of the first row. Later rows are always unpaid.
    pub is_paid: bool,
}

impl InstallmentPlan {
    /// Check the plan before anything is written.
    ///
    /// # Errors
    /// Returns [Error::EmptyDescription], [Error::NonPositiveAmount],
    /// [Error::AmountTooLarge], [Error::InvalidInstallmentCount] if the count
    /// is below 1 or the last row would be dated after the year 9999,
    /// [Error::InstallmentTooSmall] if a row would round to less than a cent,
    /// or [Error::InvalidDate].
    pub fn validate(&self) -> Result<(), Error> {
        validate_fields(&self.description, self.total)?;

        if !self.base_date.is_calendar_date() {
            return Err(Error::InvalidDate(self.base_date.to_string()));
        }

        let last_offset = self.last_offset()?;

        if self.base_date.advance_months(last_offset).is_none() {
            return Err(Error::InvalidInstallmentCount(self.installments));
        }

        if self.installments > 1 && self.per_installment() <= Decimal::ZERO {
            return Err(Error::InstallmentTooSmall);
        }

        Ok(())
    }

    /// How many months after the base date the last row falls.
    fn last_offset(&self) -> Result<u32, Error> {
        self.installments
            .checked_sub(1)
            .filter(|offset| *offset >= 0)
            .and_then(|offset| u32::try_from(offset).ok())
            .ok_or(Error::InvalidInstallmentCount(self.installments))
    }

    /// The rounded amount of each row when the plan has several installments.
    fn per_installment(&self) -> Decimal {
        round_to_cents(self.total / Decimal::from(self.installments.max(1)))
    }
}

/// Expand `plan` into the rows to be inserted, without touching the database.
///
/// A single installment keeps the plan's amount, date and description.
/// Otherwise row `i` is dated `i` months after the base date, described as
/// `"{description} (i+1/N)"` and only the first row keeps the paid status.
///
/// # Errors
/// Returns the same errors as [InstallmentPlan::validate], in which case no
/// rows are produced.
pub fn expand_installments(plan: &InstallmentPlan) -> Result<Vec<TransactionBuilder>, Error> {
    plan.validate()?;

    let description = plan.description.trim();

    let base = Transaction::build(plan.total, plan.base_date, description)
        .kind(plan.kind)
        .category_id(plan.category_id)
        .entity_type(plan.entity_type)
        .is_fixed(plan.is_fixed)
        .is_paid(plan.is_paid);

    if plan.installments == 1 {
        return Ok(vec![base]);
    }

    let count = plan.installments;
    let per_installment = plan.per_installment();

    (0..=plan.last_offset()?)
        .map(|index| -> Result<TransactionBuilder, Error> {
            let date = plan
                .base_date
                .advance_months(index)
                .ok_or(Error::InvalidInstallmentCount(count))?;

            let mut row = base.clone();
            row.amount = per_installment;
            row.date = date;
            row.description = format!("{description} ({}/{count})", index + 1);
            row.is_paid = index == 0 && plan.is_paid;
            Ok(row)
        })
        .collect()
}

/// Validate `plan` and insert all of its rows in one database transaction.
///
/// Either every row is created or, on any error, none are.
///
/// # Errors
/// Returns a validation error from [InstallmentPlan::validate],
/// [Error::InvalidCategory] if the category does not belong to the tenant or
/// [Error::SqlError] if an insert fails.
pub fn create_installments(
    tenant: &TenantId,
    plan: &InstallmentPlan,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let rows = expand_installments(plan)?;
    validate_category(tenant, plan.category_id, connection)?;

    let transaction = connection.unchecked_transaction()?;

    let created = rows
        .into_iter()
        .map(|row| insert_transaction(tenant, row, &transaction))
        .collect::<Result<Vec<_>, _>>()?;

    transaction.commit()?;

    tracing::debug!(
        "Created {} installment rows for \"{}\"",
        created.len(),
        plan.description
    );

    Ok(created)
}
