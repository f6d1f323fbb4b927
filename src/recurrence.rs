//! Carries fixed bills over to the next month.
//!
//! Every fixed expense in a month is copied to the same day of the following
//! month as an unpaid bill, unless the tenant already has an entry with the
//! same description, amount and date there. Running the copy twice on the
//! same month therefore copies nothing the second time.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    kind::Kind,
    period::MonthPeriod,
    tenant::TenantId,
    transaction::{
        EntityType, Transaction, get_transactions_in_period, has_matching_transaction,
        insert_transaction,
    },
};

/// What a copy run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    /// The number of fixed expenses in the source month.
    pub found: usize,
    /// The number of copies created in the next month.
    pub copied: usize,
}

/// Copy the tenant's fixed expenses in `period` to the following month.
///
/// When `entity_type` is given only personal or only business bills are
/// copied. All copies are inserted in one database transaction, so a failed
/// insert leaves the next month untouched.
///
/// # Errors
/// Returns [Error::SqlError] if the source month could not be read or a copy
/// could not be written.
pub fn copy_fixed_expenses(
    tenant: &TenantId,
    period: MonthPeriod,
    entity_type: Option<EntityType>,
    connection: &Connection,
) -> Result<CopyReport, Error> {
    let fixed_expenses: Vec<Transaction> =
        get_transactions_in_period(tenant, period, entity_type, connection)?
            .into_iter()
            .filter(|transaction| transaction.is_fixed && transaction.kind == Kind::Expense)
            .collect();

    if fixed_expenses.is_empty() {
        return Ok(CopyReport {
            found: 0,
            copied: 0,
        });
    }

    let transaction = connection.unchecked_transaction()?;
    let mut copied = 0;

    // Oldest first so that copies get IDs in date order.
    for expense in fixed_expenses.iter().rev() {
        let next_date = expense
            .date
            .advance_months(1)
            .ok_or_else(|| Error::InvalidDate(expense.date.to_string()))?;

        if has_matching_transaction(
            tenant,
            &expense.description,
            expense.amount,
            next_date,
            &transaction,
        )? {
            tracing::debug!(
                "Skipping \"{}\" on {next_date}, it already exists",
                expense.description
            );
            continue;
        }

        let copy = Transaction::build(expense.amount, next_date, &expense.description)
            .kind(Kind::Expense)
            .category_id(expense.category_id)
            .is_fixed(true)
            .is_paid(false)
            .entity_type(expense.entity_type)
            .tags(expense.tags.clone());

        insert_transaction(tenant, copy, &transaction)?;
        copied += 1;
    }

    transaction.commit()?;

    Ok(CopyReport {
        found: fixed_expenses.len(),
        copied,
    })
}

/// The state needed to copy fixed expenses.
#[derive(Debug, Clone)]
pub struct CopyFixedState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CopyFixedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for copying fixed expenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyFixedRequest {
    /// The source month, 1-12.
    pub month: u8,
    /// The source year.
    pub year: i32,
    /// Only copy personal or only business bills.
    #[serde(default)]
    pub entity_type: Option<EntityType>,
}

/// The response body of the copy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOutcome {
    /// False when the source month had no fixed expenses.
    pub success: bool,
    /// The number of bills copied.
    pub copied_count: usize,
    /// A human readable summary.
    pub message: String,
}

/// A route handler that copies a month's fixed expenses to the next month.
pub async fn copy_fixed_endpoint(
    State(state): State<CopyFixedState>,
    tenant: TenantId,
    payload: Result<Json<CopyFixedRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let period = match MonthPeriod::new(request.year, request.month) {
        Ok(period) => period,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let report = match copy_fixed_expenses(&tenant, period, request.entity_type, &connection) {
        Ok(report) => report,
        Err(error) => return error.into_outcome_response("Failed to process the fixed expenses."),
    };

    if report.found == 0 {
        return Json(CopyOutcome {
            success: false,
            copied_count: 0,
            message: "No fixed expenses found for this month.".to_owned(),
        })
        .into_response();
    }

    tracing::info!(
        "Copied {} of {} fixed expenses from {} for {tenant}",
        report.copied,
        report.found,
        period.label()
    );

    Json(CopyOutcome {
        success: true,
        copied_count: report.copied,
        message: format!("{} fixed expenses copied to the next month.", report.copied),
    })
    .into_response()
}
