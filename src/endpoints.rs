//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The route for the monthly summary.
pub const SUMMARY: &str = "/api/summary";
/// The route to create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to set whether a transaction has been paid.
pub const TRANSACTION_PAID: &str = "/api/transactions/{transaction_id}/paid";
/// The route to copy a month's fixed expenses to the next month.
pub const COPY_FIXED: &str = "/api/transactions/copy_fixed";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to set a category's budget.
pub const CATEGORY_BUDGET: &str = "/api/categories/{category_id}/budget";
/// The route to create the baseline categories for a tenant.
pub const TENANT_INIT: &str = "/api/tenant/init";
/// The route to get the tenant's subscription.
pub const SUBSCRIPTION: &str = "/api/subscription";
/// The route for the language model's monthly commentary.
pub const ADVISOR_REPORT: &str = "/api/advisor/report";
/// The route for turning free text into a transaction draft.
pub const ADVISOR_EXTRACT: &str = "/api/advisor/extract";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::SUMMARY);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_PAID);
        assert_endpoint_is_valid_uri(endpoints::COPY_FIXED);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_BUDGET);
        assert_endpoint_is_valid_uri(endpoints::TENANT_INIT);
        assert_endpoint_is_valid_uri(endpoints::SUBSCRIPTION);
        assert_endpoint_is_valid_uri(endpoints::ADVISOR_REPORT);
        assert_endpoint_is_valid_uri(endpoints::ADVISOR_EXTRACT);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::CATEGORY_BUDGET, 7);

        assert_eq!(formatted_path, "/api/categories/7/budget");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
