//! Turns a free-text (or transcribed voice) note into a transaction draft.
//!
//! The draft is not saved. The client shows it to the user, who submits it
//! through the normal create transaction endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    advisor::{
        AdvisorState, ChatMessage, LanguageModelClient,
        prompt::{
            EXTRACTION_TEMPERATURE, ExtractedEntry, build_extraction_system_prompt,
            parse_entry_reply,
        },
        require_client, require_premium,
    },
    category::{Category, CategoryId, get_all_categories, normalize_name},
    kind::Kind,
    tenant::TenantId,
};

/// The request body for entry extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    /// What the user said or typed, e.g. "spent 50 on fuel".
    pub text: String,
}

/// A transaction suggested by the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    /// A short description.
    pub description: String,
    /// The amount.
    pub amount: Decimal,
    /// Income or expense.
    pub kind: Kind,
    /// The matching category, `None` if the suggested name matched none.
    pub category_id: Option<CategoryId>,
    /// The name of the matching category.
    pub category_name: Option<String>,
}

impl EntryDraft {
    /// Build a draft from the model's answer, matching the category name
    /// against `categories` ignoring case and surrounding whitespace.
    pub fn resolve(entry: ExtractedEntry, categories: &[Category]) -> Self {
        let category = entry.category_name.as_deref().and_then(|name| {
            let key = normalize_name(name);
            categories
                .iter()
                .find(|category| category.name.comparison_key() == key)
        });

        Self {
            description: entry.description.trim().to_owned(),
            amount: entry.amount,
            kind: entry.kind,
            category_id: category.map(|category| category.id),
            category_name: category.map(|category| category.name.to_string()),
        }
    }
}

/// Check access and build the messages for the model.
///
/// Runs while the database lock is held, so it must not await.
fn prepare_extraction<'a>(
    tenant: &TenantId,
    text: &str,
    advisor: Option<&'a LanguageModelClient>,
    connection: &Connection,
) -> Result<(&'a LanguageModelClient, Vec<ChatMessage>, Vec<Category>), Error> {
    require_premium(tenant, connection)?;
    let client = require_client(advisor)?;
    let categories = get_all_categories(tenant, connection)?;
    let names: Vec<&str> = categories
        .iter()
        .map(|category| category.name.as_ref())
        .collect();

    let messages = vec![
        ChatMessage::system(build_extraction_system_prompt(&names)),
        ChatMessage::user(text),
    ];

    Ok((client, messages, categories))
}

/// A route handler that asks the language model to fill in a transaction.
pub async fn extract_entry_endpoint(
    State(state): State<AdvisorState>,
    tenant: TenantId,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let text = request.text.trim();
    if text.is_empty() {
        return Error::InvalidRequest("text cannot be empty".to_owned()).into_response();
    }

    let prepared = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        prepare_extraction(&tenant, text, state.advisor.as_ref(), &connection)
    };

    let (client, messages, categories) = match prepared {
        Ok(prepared) => prepared,
        Err(error) => return error.into_outcome_response("Failed to read the entry."),
    };

    let draft = client
        .chat(&messages, EXTRACTION_TEMPERATURE)
        .await
        .and_then(|reply| parse_entry_reply(&reply))
        .map(|entry| EntryDraft::resolve(entry, &categories));

    match draft {
        Ok(draft) => {
            tracing::debug!("Extracted entry {draft:?} for {tenant}");
            Json(draft).into_response()
        }
        Err(error) => error.into_outcome_response("Failed to read the entry."),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        http::{HeaderName, HeaderValue, StatusCode},
        routing::post,
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::{
        advisor::{
            AdvisorState, EntryDraft, LanguageModelClient,
            client::test_utils::{client_for, spawn_fake_model},
            extract_entry_endpoint,
            prompt::ExtractedEntry,
        },
        category::{Category, CategoryName, ensure_baseline_categories},
        db::initialize,
        endpoints,
        kind::Kind,
        subscription::{Plan, SubscriptionStatus, set_subscription},
        tenant::{TENANT_HEADER, TenantId},
    };

    fn get_test_server(premium: bool, advisor: Option<LanguageModelClient>) -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let tenant = TenantId::new_unchecked("acme");
        ensure_baseline_categories(&tenant, &conn).unwrap();
        if premium {
            set_subscription(&tenant, Plan::Annual, SubscriptionStatus::Active, &conn).unwrap();
        }
        let app = Router::new()
            .route(endpoints::ADVISOR_EXTRACT, post(extract_entry_endpoint))
            .with_state(AdvisorState {
                db_connection: Arc::new(Mutex::new(conn)),
                advisor,
            });

        TestServer::new(app).expect("Could not create test server.")
    }

    fn entry(category_name: Option<&str>) -> ExtractedEntry {
        ExtractedEntry {
            description: " Fuel ".to_owned(),
            amount: Decimal::from(50),
            category_name: category_name.map(str::to_owned),
            kind: Kind::Expense,
        }
    }

    #[test]
    fn resolves_category_ignoring_case() {
        let categories = [Category {
            id: 4,
            name: CategoryName::new_unchecked("Transport"),
            kind: Kind::Expense,
            budget: Decimal::ZERO,
        }];

        let draft = EntryDraft::resolve(entry(Some(" transport")), &categories);

        assert_eq!(draft.description, "Fuel");
        assert_eq!(draft.category_id, Some(4));
        assert_eq!(draft.category_name.as_deref(), Some("Transport"));
    }

    #[test]
    fn unknown_category_resolves_to_none() {
        let draft = EntryDraft::resolve(entry(Some("Pets")), &[]);

        assert_eq!(draft.category_id, None);
        assert_eq!(draft.category_name, None);
    }

    #[tokio::test]
    async fn extracts_draft_from_fenced_reply() {
        let reply = "```json\n{\"description\": \"Fuel\", \"amount\": 50, \
                     \"categoryName\": \"Transport\", \"type\": \"expense\"}\n```";
        let (address, received) = spawn_fake_model(StatusCode::OK, reply).await;
        let server = get_test_server(true, Some(client_for(address)));

        let response = server
            .post(endpoints::ADVISOR_EXTRACT)
            .add_header(
                HeaderName::from_static(TENANT_HEADER),
                HeaderValue::from_static("acme"),
            )
            .json(&json!({ "text": "filled the tank for 50" }))
            .await;

        response.assert_status_ok();
        let draft: EntryDraft = response.json();
        assert_eq!(draft.amount, Decimal::from(50));
        assert_eq!(draft.category_name.as_deref(), Some("Transport"));
        assert!(draft.category_id.is_some());
        let bodies = received.bodies.lock().unwrap();
        assert_eq!(bodies[0]["temperature"], 0.0);
        let system_prompt = bodies[0]["messages"][0]["content"].as_str().unwrap();
        assert!(system_prompt.contains("Groceries"));
    }

    #[tokio::test]
    async fn free_tenant_gets_payment_required() {
        let server = get_test_server(false, None);

        let response = server
            .post(endpoints::ADVISOR_EXTRACT)
            .add_header(
                HeaderName::from_static(TENANT_HEADER),
                HeaderValue::from_static("acme"),
            )
            .json(&json!({ "text": "filled the tank for 50" }))
            .await;

        response.assert_status(StatusCode::PAYMENT_REQUIRED);
    }

    #[tokio::test]
    async fn prose_reply_is_bad_gateway() {
        let (address, _) = spawn_fake_model(StatusCode::OK, "I am not sure.").await;
        let server = get_test_server(true, Some(client_for(address)));

        let response = server
            .post(endpoints::ADVISOR_EXTRACT)
            .add_header(
                HeaderName::from_static(TENANT_HEADER),
                HeaderValue::from_static("acme"),
            )
            .json(&json!({ "text": "filled the tank for 50" }))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let server = get_test_server(true, None);

        let response = server
            .post(endpoints::ADVISOR_EXTRACT)
            .add_header(
                HeaderName::from_static(TENANT_HEADER),
                HeaderValue::from_static("acme"),
            )
            .json(&json!({ "text": "  " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
