//! Endpoints for listing and creating categories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{CategoryName, create_category, domain::CategoryForm, get_all_categories},
    tenant::TenantId,
};

/// The state needed to list, create and update categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the tenant's categories.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    tenant: TenantId,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_all_categories(&tenant, &connection) {
        Ok(categories) => Json(categories).into_response(),
        Err(error) => error.into_outcome_response("Failed to load the categories."),
    }
}

/// A route handler for creating a category, responds with the new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    tenant: TenantId,
    payload: Result<Json<CategoryForm>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_category(&tenant, name, form.kind, &connection) {
        Ok(category) => {
            tracing::info!("Created category {} for tenant {tenant}", category.id);
            (StatusCode::CREATED, Json(category)).into_response()
        }
        Err(error) => error.into_outcome_response("Failed to save the category."),
    }
}
