//! Defines the endpoints for editing a transaction and for marking it paid.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    outcome::Outcome,
    tenant::TenantId,
    transaction::core::{TransactionUpdate, set_paid, update_transaction},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for changing the paid status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaidForm {
    /// Whether the transaction has been settled.
    pub is_paid: bool,
}

/// A route handler for overwriting a transaction's editable fields.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    tenant: TenantId,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Response {
    let transaction_id = match path {
        Ok(Path(transaction_id)) => transaction_id,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let update = match payload {
        Ok(Json(update)) => update,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_transaction(&tenant, transaction_id, &update, &connection) {
        Ok(()) => Outcome::success().into_response(),
        Err(error) => {
            tracing::debug!("Could not update transaction {transaction_id}: {error}");
            error.into_outcome_response("Failed to update the transaction.")
        }
    }
}

/// A route handler for setting whether a transaction has been paid.
pub async fn set_paid_endpoint(
    State(state): State<EditTransactionState>,
    tenant: TenantId,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<PaidForm>, JsonRejection>,
) -> Response {
    let transaction_id = match path {
        Ok(Path(transaction_id)) => transaction_id,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match set_paid(&tenant, transaction_id, form.is_paid, &connection) {
        Ok(()) => Outcome::success().into_response(),
        Err(error) => error.into_outcome_response("Failed to update the transaction."),
    }
}
