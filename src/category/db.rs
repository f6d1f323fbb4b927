//! Database operations for categories.
//!
//! Every query is scoped to a tenant. A category ID that belongs to another
//! tenant behaves exactly like one that does not exist.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
    kind::Kind,
    money::{MAX_AMOUNT, get_decimal, to_sql_text},
    tenant::TenantId,
};

/// Create a category for `tenant` and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateCategoryName] if the tenant already has a category
/// with the same name, ignoring case and surrounding whitespace.
pub fn create_category(
    tenant: &TenantId,
    name: CategoryName,
    kind: Kind,
    connection: &Connection,
) -> Result<Category, Error> {
    let key = name.comparison_key();
    let is_duplicate = get_all_categories(tenant, connection)?
        .iter()
        .any(|category| category.name.comparison_key() == key);

    if is_duplicate {
        return Err(Error::DuplicateCategoryName(name.to_string()));
    }

    insert_category(tenant, name, kind, connection)
}

/// Insert a category without checking for duplicate names.
pub(super) fn insert_category(
    tenant: &TenantId,
    name: CategoryName,
    kind: Kind,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (tenant_id, name, kind, budget) VALUES (?1, ?2, ?3, '0');",
        (tenant, name.as_ref(), kind),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        kind,
        budget: Decimal::ZERO,
    })
}

/// Retrieve a single category owned by `tenant`.
///
/// # Errors
/// Returns [Error::NotFound] if the ID does not refer to one of the tenant's categories.
pub fn get_category(
    tenant: &TenantId,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, budget FROM category WHERE id = :id AND tenant_id = :tenant_id;",
        )?
        .query_row(
            rusqlite::named_params! { ":id": category_id, ":tenant_id": tenant },
            map_row,
        )
        .map_err(|error| error.into())
}

/// Check that `category_id`, if any, refers to one of the tenant's categories.
///
/// # Errors
/// Returns [Error::InvalidCategory] if it does not.
pub fn validate_category(
    tenant: &TenantId,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(id) = category_id else {
        return Ok(());
    };

    match get_category(tenant, id, connection) {
        Ok(_) => Ok(()),
        Err(Error::NotFound) => Err(Error::InvalidCategory(category_id)),
        Err(error) => Err(error),
    }
}

/// Retrieve all of the tenant's categories ordered alphabetically by name.
pub fn get_all_categories(
    tenant: &TenantId,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, budget FROM category WHERE tenant_id = :tenant_id ORDER BY name ASC;",
        )?
        .query_map(&[(":tenant_id", tenant)], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Overwrite a category's monthly budget. Zero removes the budget.
///
/// # Errors
/// Returns [Error::NegativeBudget] for negative amounts,
/// [Error::AmountTooLarge] for amounts above [MAX_AMOUNT] and
/// [Error::UpdateMissingCategory] if the category does not belong to the tenant.
pub fn set_category_budget(
    tenant: &TenantId,
    category_id: CategoryId,
    budget: Decimal,
    connection: &Connection,
) -> Result<(), Error> {
    if budget < Decimal::ZERO {
        return Err(Error::NegativeBudget);
    }

    if budget > MAX_AMOUNT {
        return Err(Error::AmountTooLarge);
    }

    let rows_affected = connection.execute(
        "UPDATE category SET budget = ?1 WHERE id = ?2 AND tenant_id = ?3",
        (to_sql_text(budget), category_id, tenant),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            budget TEXT NOT NULL DEFAULT '0'
        );

        CREATE INDEX IF NOT EXISTS idx_category_tenant ON category(tenant_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let kind = row.get(2)?;
    let budget = get_decimal(row, 3)?;

    Ok(Category {
        id,
        name,
        kind,
        budget,
    })
}
