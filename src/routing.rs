//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState,
    advisor::{extract_entry_endpoint, generate_report_endpoint},
    category::{create_category_endpoint, get_categories_endpoint, set_budget_endpoint},
    endpoints,
    not_found::get_404_not_found,
    recurrence::copy_fixed_endpoint,
    subscription::get_subscription_endpoint,
    summary::get_summary_endpoint,
    tenant::initialize_tenant_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        set_paid_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route expects the tenant header set by the authentication proxy.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_PAID, put(set_paid_endpoint))
        .route(endpoints::COPY_FIXED, post(copy_fixed_endpoint))
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(endpoints::CATEGORY_BUDGET, put(set_budget_endpoint))
        .route(endpoints::TENANT_INIT, post(initialize_tenant_endpoint))
        .route(endpoints::SUBSCRIPTION, get(get_subscription_endpoint))
        .route(endpoints::ADVISOR_REPORT, post(generate_report_endpoint))
        .route(endpoints::ADVISOR_EXTRACT, post(extract_entry_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}
