//! Finboard is a finance tracker for individuals and small businesses.
//!
//! This library provides a JSON API for recording income and expenses,
//! splitting purchases into monthly installments, carrying fixed bills over to
//! the next month, tracking category budgets and summarising a month of
//! activity. Premium tenants can also ask an external language model for
//! commentary on their month or for help turning free text into a
//! transaction.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod advisor;
mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod kind;
mod ledger_date;
mod logging;
mod money;
mod not_found;
mod outcome;
mod period;
mod recurrence;
mod routing;
mod subscription;
mod summary;
mod tenant;
mod timezone;
mod transaction;

pub use advisor::{AiConfig, LanguageModelClient};
pub use app_state::AppState;
pub use category::ensure_baseline_categories;
pub use db::initialize as initialize_db;
pub use kind::Kind;
pub use ledger_date::LedgerDate;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::MonthPeriod;
pub use recurrence::{CopyReport, copy_fixed_expenses};
pub use routing::build_router;
pub use subscription::{Plan, SubscriptionStatus, set_subscription};
pub use tenant::TenantId;
pub use timezone::get_local_offset;
pub use transaction::{
    EntityType, InstallmentPlan, Transaction, TransactionBuilder, count_transactions,
    create_installments, create_transaction,
};

use crate::{category::CategoryId, outcome::Outcome};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry the tenant header set by the authentication proxy.
    #[error("the request is missing the tenant header")]
    MissingTenant,

    /// The tenant header was present but empty or not valid text.
    #[error("the tenant header is not a valid tenant ID")]
    InvalidTenant,

    /// The request body could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A transaction was submitted with an empty description.
    #[error("Description cannot be empty")]
    EmptyDescription,

    /// A transaction was submitted without an amount.
    #[error("Amount is required")]
    MissingAmount,

    /// A transaction amount was zero or negative.
    ///
    /// The direction of money is carried by the transaction kind, so amounts
    /// are always positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// An amount or budget was larger than [money::MAX_AMOUNT].
    #[error("Amount must not be more than {}", money::MAX_AMOUNT)]
    AmountTooLarge,

    /// Splitting the total over the installments leaves less than a cent per row.
    #[error("Each installment must be at least 0.01")]
    InstallmentTooSmall,

    /// The number of installments was below 1, or so large that the last row
    /// would be dated after the year 9999.
    #[error("{0} is not a valid number of installments")]
    InvalidInstallmentCount(i64),

    /// A date string could not be parsed or does not exist in the calendar.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),

    /// A month number outside of 1-12 or a year outside of the supported range.
    #[error("{0} is not a valid month")]
    InvalidPeriod(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The tenant already has a category with this name.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// A negative budget was given for a category.
    #[error("Budget cannot be negative")]
    NegativeBudget,

    /// The category ID does not refer to a category owned by the tenant.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// The feature is only available to tenants with an active paid plan.
    #[error("this feature requires an active premium subscription")]
    PremiumRequired,

    /// There is no data for the requested period.
    #[error("Not enough data for an analysis")]
    InsufficientData,

    /// The language model could not be reached or returned an error.
    ///
    /// The string is for the server logs only.
    #[error("the analysis service is unavailable: {0}")]
    AiUnavailable(String),

    /// The language model replied with something that is not the expected JSON.
    #[error("could not understand the analysis service response: {0}")]
    AiResponseInvalid(String),

    /// A sum of amounts does not fit in a decimal.
    #[error("the total of the amounts is too large to represent")]
    AmountOverflow,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(None),
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes the error.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingTenant => StatusCode::UNAUTHORIZED,
            Error::InvalidTenant
            | Error::InvalidRequest(_)
            | Error::EmptyDescription
            | Error::MissingAmount
            | Error::NonPositiveAmount
            | Error::AmountTooLarge
            | Error::InstallmentTooSmall
            | Error::InvalidInstallmentCount(_)
            | Error::InvalidDate(_)
            | Error::InvalidPeriod(_)
            | Error::EmptyCategoryName
            | Error::NegativeBudget
            | Error::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCategoryName(_) => StatusCode::CONFLICT,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory => StatusCode::NOT_FOUND,
            Error::PremiumRequired => StatusCode::PAYMENT_REQUIRED,
            Error::InsufficientData => StatusCode::UNPROCESSABLE_ENTITY,
            Error::AiUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::AiResponseInvalid(_) => StatusCode::BAD_GATEWAY,
            Error::AmountOverflow
            | Error::SqlError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error into a JSON [Outcome] response.
    ///
    /// Errors the client can act on are reported with their own message.
    /// Everything else is logged and reported with `fallback_message`, e.g.
    /// "Failed to save the transaction.", so that SQL details never reach the
    /// client.
    pub(crate) fn into_outcome_response(self, fallback_message: &str) -> Response {
        let status_code = self.status_code();

        let message = match self {
            Error::AiUnavailable(ref details) | Error::AiResponseInvalid(ref details) => {
                tracing::error!("analysis service error: {details}");
                "The analysis service is unavailable at the moment. Try again later.".to_owned()
            }
            ref error if status_code.is_server_error() => {
                tracing::error!("{fallback_message} {error}");
                fallback_message.to_owned()
            }
            error => error.to_string(),
        };

        (status_code, Json(Outcome::failure(message))).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_outcome_response(
            "An unexpected error occurred, check the server logs for more details.",
        )
    }
}
