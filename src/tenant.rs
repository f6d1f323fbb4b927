//! Tenants scope every category, transaction and subscription.
//!
//! Authentication happens upstream of this service. The authenticating proxy
//! forwards the account ID in the [TENANT_HEADER] header and the handlers
//! receive it through the [TenantId] extractor.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use rusqlite::{
    Connection,
    types::{ToSql, ToSqlOutput},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, category::ensure_baseline_categories, outcome::Outcome};

/// The request header carrying the tenant ID.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// The longest tenant ID accepted.
const MAX_TENANT_ID_LENGTH: usize = 128;

/// An opaque, non-empty account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant ID from the raw header value.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTenant] if `raw` is empty after trimming or too long.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();

        if raw.is_empty() || raw.len() > MAX_TENANT_ID_LENGTH {
            Err(Error::InvalidTenant)
        } else {
            Ok(Self(raw.to_owned()))
        }
    }

    /// Create a tenant ID without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for TenantId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl<S> FromRequestParts<S> for TenantId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(TENANT_HEADER)
            .ok_or(Error::MissingTenant)?;
        let raw = header.to_str().map_err(|_| Error::InvalidTenant)?;

        TenantId::new(raw)
    }
}

/// The state needed to initialise a tenant.
#[derive(Debug, Clone)]
pub struct InitializeTenantState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for InitializeTenantState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that makes sure a new tenant has the baseline categories.
///
/// Safe to call repeatedly, later calls create nothing.
pub async fn initialize_tenant_endpoint(
    State(state): State<InitializeTenantState>,
    tenant: TenantId,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match ensure_baseline_categories(&tenant, &connection) {
        Ok(created) => {
            tracing::info!("Initialized tenant {tenant}, created {created} categories");
            Outcome::success_with_message(format!("{created} categories created.")).into_response()
        }
        Err(error) => error.into_outcome_response("Failed to initialize the account."),
    }
}
