//! The categories every tenant starts with.

use std::collections::HashSet;

use rusqlite::Connection;

use crate::{
    Error,
    category::{CategoryName, db::insert_category, get_all_categories, normalize_name},
    kind::Kind,
    tenant::TenantId,
};

/// The baseline category set: ten expense and two income categories.
pub const BASELINE_CATEGORIES: [(&str, Kind); 12] = [
    ("Travel", Kind::Expense),
    ("Subscriptions & Apps", Kind::Expense),
    ("Groceries", Kind::Expense),
    ("Dining & Leisure", Kind::Expense),
    ("Supplements", Kind::Expense),
    ("Clothing & Gym", Kind::Expense),
    ("Financing", Kind::Expense),
    ("Reimbursements & Loans", Kind::Expense),
    ("Transport", Kind::Expense),
    ("Health", Kind::Expense),
    ("Salary", Kind::Income),
    ("Investments", Kind::Income),
];

/// Create any baseline category the tenant does not have yet.
///
/// Existing names are matched ignoring case and surrounding whitespace, so a
/// tenant's own " groceries " counts as "Groceries". All inserts happen in one
/// database transaction.
///
/// Returns the number of categories created.
///
/// # Errors
/// Returns [Error::SqlError] if the categories could not be read or written.
pub fn ensure_baseline_categories(tenant: &TenantId, connection: &Connection) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    let mut existing: HashSet<String> = get_all_categories(tenant, &transaction)?
        .into_iter()
        .map(|category| category.name.comparison_key())
        .collect();

    let mut created = 0;

    for (name, kind) in BASELINE_CATEGORIES {
        if existing.insert(normalize_name(name)) {
            insert_category(tenant, CategoryName::new_unchecked(name), kind, &transaction)?;
            created += 1;
        }
    }

    transaction.commit()?;

    Ok(created)
}
