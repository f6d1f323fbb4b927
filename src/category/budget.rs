//! Defines the endpoint for setting a category's monthly budget.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::{
    Error,
    category::{CategoryId, create::CategoryState, set_category_budget},
    outcome::Outcome,
    tenant::TenantId,
};

/// Request body for setting a budget.
///
/// A missing, null or blank budget removes the budget, the same as zero.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BudgetForm {
    /// The monthly spending limit, as a number or a decimal string.
    #[serde(default, deserialize_with = "deserialize_optional_budget")]
    pub budget: Option<Decimal>,
}

/// Budget inputs come from a text field, so an empty string means "no budget".
fn deserialize_optional_budget<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBudget {
        Amount(Decimal),
        Text(String),
    }

    match Option::<RawBudget>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawBudget::Amount(amount)) => Ok(Some(amount)),
        Some(RawBudget::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawBudget::Text(text)) => Err(de::Error::custom(format!(
            "\"{text}\" is not a valid budget"
        ))),
    }
}

/// A route handler that overwrites a category's budget.
pub async fn set_budget_endpoint(
    State(state): State<CategoryState>,
    tenant: TenantId,
    path: Result<Path<CategoryId>, PathRejection>,
    payload: Result<Json<BudgetForm>, JsonRejection>,
) -> Response {
    let category_id = match path {
        Ok(Path(category_id)) => category_id,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };
    let budget = form.budget.unwrap_or(Decimal::ZERO);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match set_category_budget(&tenant, category_id, budget, &connection) {
        Ok(()) if budget.is_zero() => Outcome::success_with_message("Budget removed.").into_response(),
        Ok(()) => Outcome::success().into_response(),
        Err(error) => error.into_outcome_response("Failed to update the budget."),
    }
}
