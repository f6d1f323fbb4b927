//! The monthly commentary endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    advisor::{
        AdvisorState, ChatMessage, LanguageModelClient,
        prompt::{REPORT_SYSTEM_PROMPT, REPORT_TEMPERATURE, build_report_prompt},
        require_client, require_premium,
    },
    outcome::Outcome,
    period::MonthPeriod,
    summary::load_summary,
    tenant::TenantId,
    transaction::EntityType,
};

/// The request body for the monthly commentary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    /// The month, 1-12.
    pub month: u8,
    /// The year.
    pub year: i32,
    /// Only discuss personal or only business transactions.
    #[serde(default)]
    pub entity_type: Option<EntityType>,
}

/// Check access and build the messages for the model.
///
/// Runs while the database lock is held, so it must not await.
fn prepare_report<'a>(
    tenant: &TenantId,
    request: &ReportRequest,
    advisor: Option<&'a LanguageModelClient>,
    connection: &Connection,
) -> Result<(&'a LanguageModelClient, Vec<ChatMessage>), Error> {
    require_premium(tenant, connection)?;
    let client = require_client(advisor)?;
    let period = MonthPeriod::new(request.year, request.month)?;
    let summary = load_summary(tenant, period, request.entity_type, connection)?;

    if summary.transaction_count() == 0 {
        return Err(Error::InsufficientData);
    }

    let messages = vec![
        ChatMessage::system(REPORT_SYSTEM_PROMPT),
        ChatMessage::user(build_report_prompt(period, &summary)),
    ];

    Ok((client, messages))
}

/// A route handler that asks the language model to comment on a month.
pub async fn generate_report_endpoint(
    State(state): State<AdvisorState>,
    tenant: TenantId,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let prepared = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        prepare_report(&tenant, &request, state.advisor.as_ref(), &connection)
    };

    let (client, messages) = match prepared {
        Ok(prepared) => prepared,
        Err(error) => return error.into_outcome_response("Failed to generate the report."),
    };

    match client.chat(&messages, REPORT_TEMPERATURE).await {
        Ok(commentary) => {
            tracing::info!(
                "Generated report for {tenant} for {}/{}",
                request.month,
                request.year
            );
            Outcome::success_with_message(commentary).into_response()
        }
        Err(error) => error.into_outcome_response("Failed to generate the report."),
    }
}
