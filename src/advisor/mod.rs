//! Premium features backed by an external language model: commentary on a
//! month of activity and turning free text into a transaction draft.

mod client;
mod extract;
mod prompt;
mod report;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, Error, subscription::is_premium, tenant::TenantId};

pub use client::{AiConfig, ChatMessage, LanguageModelClient};
pub use extract::{EntryDraft, extract_entry_endpoint};
pub use report::generate_report_endpoint;

/// The state needed by the advisor endpoints.
#[derive(Debug, Clone)]
pub struct AdvisorState {
    /// The database connection for reading subscriptions, transactions and categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The language model client, `None` when no API key is configured.
    pub advisor: Option<LanguageModelClient>,
}

impl FromRef<AppState> for AdvisorState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            advisor: state.advisor.clone(),
        }
    }
}

/// Fail with [Error::PremiumRequired] unless the tenant has an active paid plan.
fn require_premium(tenant: &TenantId, connection: &Connection) -> Result<(), Error> {
    if is_premium(tenant, connection)? {
        Ok(())
    } else {
        Err(Error::PremiumRequired)
    }
}

/// The configured client, or [Error::AiUnavailable] if there is none.
fn require_client(advisor: Option<&LanguageModelClient>) -> Result<&LanguageModelClient, Error> {
    advisor.ok_or_else(|| Error::AiUnavailable("no API key is configured".to_owned()))
}
