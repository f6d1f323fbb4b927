use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, database_id::TransactionId, outcome::Outcome, tenant::TenantId,
    transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    tenant: TenantId,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Response {
    let transaction_id = match path {
        Ok(Path(transaction_id)) => transaction_id,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_transaction(&tenant, transaction_id, &connection) {
        Ok(()) => {
            tracing::info!("Deleted transaction {transaction_id} for {tenant}");
            Outcome::success().into_response()
        }
        Err(error) => error.into_outcome_response("Failed to delete the transaction."),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        http::{HeaderName, HeaderValue, StatusCode},
        routing::delete,
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    use crate::{
        Error,
        db::initialize,
        endpoints::{self, format_endpoint},
        ledger_date::LedgerDate,
        outcome::Outcome,
        tenant::{TENANT_HEADER, TenantId},
        transaction::{
            Transaction, create_transaction,
            delete_endpoint::{DeleteTransactionState, delete_transaction_endpoint},
            get_transaction,
        },
    };

    fn get_test_state() -> DeleteTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn deletes_transaction() {
        let state = get_test_state();
        let tenant = TenantId::new_unchecked("acme");
        let transaction = create_transaction(
            &tenant,
            Transaction::build(Decimal::ONE, LedgerDate::new(2025, 1, 1).unwrap(), "Rent"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let app = Router::new()
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .with_state(state.clone());
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .add_header(
                HeaderName::from_static(TENANT_HEADER),
                HeaderValue::from_static("acme"),
            )
            .await;

        response.assert_status_ok();
        let outcome: Outcome = response.json();
        assert!(outcome.success);
        assert_eq!(
            get_transaction(&tenant, transaction.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_missing_transaction_is_not_found() {
        let app = Router::new()
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .with_state(get_test_state());
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, 1337))
            .add_header(
                HeaderName::from_static(TENANT_HEADER),
                HeaderValue::from_static("acme"),
            )
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let outcome: Outcome = response.json();
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn non_numeric_id_gets_json_error() {
        let app = Router::new()
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .with_state(get_test_state());
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .delete("/api/transactions/abc")
            .add_header(
                HeaderName::from_static(TENANT_HEADER),
                HeaderValue::from_static("acme"),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let outcome: Outcome = response.json();
        assert!(!outcome.success);
    }
}
