//! Subscription plans and the premium check.
//!
//! The payment provider's webhook lives outside of this service. Whatever it
//! decides ends up here through [set_subscription].

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::{
    Connection, OptionalExtension,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, tenant::TenantId};

/// The plan a tenant pays for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// No paid plan.
    #[default]
    Free,
    /// Billed every month.
    Monthly,
    /// Billed every three months.
    Quarterly,
    /// Billed every six months.
    Semiannual,
    /// Billed every year.
    Annual,
}

/// Whether the plan is currently in effect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Paid up.
    Active,
    /// Never paid, cancelled or lapsed.
    #[default]
    Inactive,
}

macro_rules! sql_text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// The name used in storage and in the JSON API.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} \"{other}\"", stringify!($name))),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error: String| FromSqlError::Other(error.into()))
            }
        }
    };
}

sql_text_enum!(Plan {
    Free => "free",
    Monthly => "monthly",
    Quarterly => "quarterly",
    Semiannual => "semiannual",
    Annual => "annual",
});

sql_text_enum!(SubscriptionStatus {
    Active => "active",
    Inactive => "inactive",
});

/// A tenant's plan and whether it is in effect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// The plan.
    pub plan: Plan,
    /// Whether the plan is in effect.
    pub status: SubscriptionStatus,
}

impl Subscription {
    /// Whether the tenant may use the premium features.
    pub fn is_premium(&self) -> bool {
        self.status == SubscriptionStatus::Active && self.plan != Plan::Free
    }
}

/// Get the tenant's subscription, the free plan if there is no record.
pub fn get_subscription(tenant: &TenantId, connection: &Connection) -> Result<Subscription, Error> {
    let subscription = connection
        .query_row(
            "SELECT plan, status FROM subscription WHERE tenant_id = ?1",
            [tenant],
            |row| {
                Ok(Subscription {
                    plan: row.get(0)?,
                    status: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(subscription.unwrap_or_default())
}

/// Whether the tenant has an active paid plan.
pub fn is_premium(tenant: &TenantId, connection: &Connection) -> Result<bool, Error> {
    get_subscription(tenant, connection).map(|subscription| subscription.is_premium())
}

/// Create or overwrite the tenant's subscription.
pub fn set_subscription(
    tenant: &TenantId,
    plan: Plan,
    status: SubscriptionStatus,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO subscription (tenant_id, plan, status) VALUES (?1, ?2, ?3)
         ON CONFLICT(tenant_id) DO UPDATE SET plan = excluded.plan, status = excluded.status",
        rusqlite::params![tenant, plan, status],
    )?;

    Ok(())
}

/// Initialize the subscription table.
pub fn create_subscription_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS subscription (
            tenant_id TEXT PRIMARY KEY,
            plan TEXT NOT NULL DEFAULT 'free',
            status TEXT NOT NULL DEFAULT 'inactive'
        )",
        (),
    )?;

    Ok(())
}

/// The state needed to report a subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionState {
    /// The database connection for reading subscriptions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SubscriptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body of the subscription endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionView {
    /// The plan.
    pub plan: Plan,
    /// Whether the plan is in effect.
    pub status: SubscriptionStatus,
    /// Whether the premium features are available.
    pub is_premium: bool,
}

/// A route handler that reports the tenant's plan.
pub async fn get_subscription_endpoint(
    State(state): State<SubscriptionState>,
    tenant: TenantId,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_subscription(&tenant, &connection) {
        Ok(subscription) => Json(SubscriptionView {
            plan: subscription.plan,
            status: subscription.status,
            is_premium: subscription.is_premium(),
        })
        .into_response(),
        Err(error) => error.into_outcome_response("Failed to load the subscription."),
    }
}
