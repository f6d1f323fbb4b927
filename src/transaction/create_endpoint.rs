//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    category::CategoryId,
    endpoints::{self, format_endpoint},
    kind::Kind,
    ledger_date::LedgerDate,
    outcome::Outcome,
    tenant::TenantId,
    timezone::today,
    transaction::{
        EntityType,
        installments::{InstallmentPlan, create_installments},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for creating a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Text detailing the transaction.
    pub description: String,
    /// The total amount. Split evenly when there is more than one installment.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// The date of the (first) transaction, today in the local timezone if not given.
    #[serde(default)]
    pub date: Option<LedgerDate>,
    /// Income or expense.
    #[serde(default = "default_kind")]
    pub kind: Kind,
    /// The category the transaction belongs to.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is a recurring bill.
    #[serde(default)]
    pub is_fixed: bool,
    /// Whether the transaction has been settled, defaults to paid.
    #[serde(default = "default_is_paid")]
    pub is_paid: bool,
    /// Personal or business, defaults to personal.
    #[serde(default)]
    pub entity_type: EntityType,
    /// How many monthly installments to split the amount into.
    #[serde(default)]
    pub installments: Option<i64>,
}

fn default_kind() -> Kind {
    Kind::Expense
}

fn default_is_paid() -> bool {
    true
}

/// A route handler for creating a transaction, or a series of installments.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    tenant: TenantId,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let Some(amount) = request.amount else {
        return Error::MissingAmount.into_response();
    };

    let base_date = match request.date {
        Some(date) => date,
        None => match today(&state.local_timezone) {
            Ok(date) => date,
            Err(error) => return error.into_outcome_response("Failed to save the transaction."),
        },
    };

    let plan = InstallmentPlan {
        total: amount,
        installments: request.installments.unwrap_or(1),
        base_date,
        description: request.description,
        kind: request.kind,
        category_id: request.category_id,
        entity_type: request.entity_type,
        is_fixed: request.is_fixed,
        is_paid: request.is_paid,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_installments(&tenant, &plan, &connection) {
        Ok(created) => {
            tracing::info!("Created {} transactions for {tenant}", created.len());
            let outcome =
                Outcome::success_with_message(format!("{} transactions created.", created.len()));

            match created.first() {
                Some(first) => (
                    StatusCode::CREATED,
                    [(
                        LOCATION,
                        format_endpoint(endpoints::TRANSACTION, first.id),
                    )],
                    Json(outcome),
                )
                    .into_response(),
                None => outcome.with_status(StatusCode::CREATED),
            }
        }
        Err(error) => error.into_outcome_response("Failed to save the transaction."),
    }
}
