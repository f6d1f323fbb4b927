//! HTTP handler and data loading for the monthly summary.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Query, QueryRejection};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    category::get_all_categories,
    period::MonthPeriod,
    summary::{Summary, summarize},
    tenant::TenantId,
    transaction::{EntityType, get_transactions_in_period},
};

/// The state needed for the summary.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for the summary.
///
/// An empty `entity_type` is the same as leaving it out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryParams {
    /// The month, 1-12.
    pub month: u8,
    /// The year.
    pub year: i32,
    /// Only include personal or only business transactions.
    #[serde(default)]
    pub entity_type: Option<EntityType>,
}

/// Read the tenant's data for `period` and aggregate it.
///
/// # Errors
/// Returns [Error::SqlError] if the transactions or categories could not be
/// read, or [Error::AmountOverflow] if a total does not fit in a decimal.
pub fn load_summary(
    tenant: &TenantId,
    period: MonthPeriod,
    entity_type: Option<EntityType>,
    connection: &Connection,
) -> Result<Summary, Error> {
    let transactions = get_transactions_in_period(tenant, period, entity_type, connection)?;
    let categories = get_all_categories(tenant, connection)?;

    summarize(&transactions, &categories, period, entity_type)
}

/// A route handler that returns the summary for a month.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    tenant: TenantId,
    query: Result<Query<SummaryParams>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => return Error::InvalidRequest(rejection.to_string()).into_response(),
    };

    let period = match MonthPeriod::new(params.year, params.month) {
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

    match load_summary(&tenant, period, params.entity_type, &connection) {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => error.into_outcome_response("Failed to load the summary."),
    }
}
