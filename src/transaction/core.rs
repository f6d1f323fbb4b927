//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    category::{CategoryId, validate_category},
    database_id::TransactionId,
    kind::Kind,
    ledger_date::LedgerDate,
    money::{MAX_AMOUNT, get_decimal, to_sql_text},
    period::MonthPeriod,
    tenant::TenantId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Which side of the ledger a transaction belongs to.
///
/// One tenant keeps personal (PF) and business (PJ) money in the same ledger
/// and filters by this field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Personal money, "PF".
    #[default]
    #[serde(alias = "pf")]
    Personal,
    /// Business money, "PJ".
    #[serde(alias = "pj")]
    Business,
}

impl EntityType {
    /// The name used in storage and in the JSON API.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Personal => "personal",
            EntityType::Business => "business",
        }
    }

    /// The short label shown to users, "PF" or "PJ".
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Personal => "PF",
            EntityType::Business => "PJ",
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" | "pf" => Ok(EntityType::Personal),
            "business" | "pj" => Ok(EntityType::Business),
            other => Err(format!("unknown entity type \"{other}\"")),
        }
    }
}

impl ToSql for EntityType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EntityType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, always positive.
    pub amount: Decimal,
    /// When the transaction happened or is due.
    pub date: LedgerDate,
    /// Whether money came in or went out.
    pub kind: Kind,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// Whether this is a recurring bill that is carried over to the next month.
    pub is_fixed: bool,
    /// Whether the transaction has been settled.
    pub is_paid: bool,
    /// Personal or business.
    pub entity_type: EntityType,
    /// Free-form labels.
    pub tags: Vec<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: Decimal, date: LedgerDate, description: &str) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            kind: Kind::Expense,
            category_id: None,
            is_fixed: false,
            is_paid: true,
            entity_type: EntityType::Personal,
            tags: Vec::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// New transactions default to a paid, non-recurring, personal expense with
/// no category and no tags.
///
/// # Examples
///
/// ```ignore
/// use rust_decimal::Decimal;
///
/// use crate::{kind::Kind, ledger_date::LedgerDate, transaction::Transaction};
///
/// let rent = Transaction::build(
///         Decimal::new(120000, 2),
///         LedgerDate::new(2025, 1, 5).unwrap(),
///         "Rent",
///     )
///     .kind(Kind::Expense)
///     .is_fixed(true)
///     .is_paid(false);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money, must be greater than zero.
    pub amount: Decimal,
    /// The date of the transaction.
    pub date: LedgerDate,
    /// A human-readable description, must not be blank.
    pub description: String,
    /// Income or expense.
    pub kind: Kind,
    /// The category of the transaction, e.g. "Groceries", "Transport".
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is a recurring bill.
    pub is_fixed: bool,
    /// Whether the transaction has been settled.
    pub is_paid: bool,
    /// Personal or business.
    pub entity_type: EntityType,
    /// Free-form labels.
    pub tags: Vec<String>,
}

impl TransactionBuilder {
    /// Set whether the transaction is income or an expense.
    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the category ID for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Mark the transaction as a recurring bill.
    pub fn is_fixed(mut self, is_fixed: bool) -> Self {
        self.is_fixed = is_fixed;
        self
    }

    /// Set whether the transaction has been settled.
    pub fn is_paid(mut self, is_paid: bool) -> Self {
        self.is_paid = is_paid;
        self
    }

    /// Set whether the transaction is personal or business.
    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = entity_type;
        self
    }

    /// Set the tags for the transaction.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// The fields overwritten when a transaction is edited.
///
/// The paid flag and tags are left as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    /// The new description.
    pub description: String,
    /// The new amount.
    pub amount: Decimal,
    /// The new date.
    pub date: LedgerDate,
    /// Income or expense.
    pub kind: Kind,
    /// The new category, `None` clears the category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is a recurring bill.
    #[serde(default)]
    pub is_fixed: bool,
    /// Personal or business.
    #[serde(default)]
    pub entity_type: EntityType,
}

/// Check the fields shared by new and edited transactions.
///
/// # Errors
/// Returns [Error::EmptyDescription] for a blank description,
/// [Error::NonPositiveAmount] if `amount` is zero or negative and
/// [Error::AmountTooLarge] if it is above [MAX_AMOUNT].
pub fn validate_fields(description: &str, amount: Decimal) -> Result<(), Error> {
    if description.trim().is_empty() {
        return Err(Error::EmptyDescription);
    }

    if amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount);
    }

    if amount > MAX_AMOUNT {
        return Err(Error::AmountTooLarge);
    }

    Ok(())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDescription] or [Error::NonPositiveAmount] if the builder fails validation,
/// - or [Error::InvalidCategory] if the category ID does not refer to one of the tenant's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    tenant: &TenantId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_fields(&builder.description, builder.amount)?;
    validate_category(tenant, builder.category_id, connection)?;
    insert_transaction(tenant, builder, connection)
}

/// Insert a transaction that has already been validated.
pub(crate) fn insert_transaction(
    tenant: &TenantId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (tenant_id, description, amount, date, kind, category_id, is_fixed, is_paid, entity_type, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING id, description, amount, date, kind, category_id, is_fixed, is_paid, entity_type, tags",
        )?
        .query_row(
            rusqlite::params![
                tenant,
                builder.description.trim(),
                to_sql_text(builder.amount),
                builder.date,
                builder.kind,
                builder.category_id,
                builder.is_fixed,
                builder.is_paid,
                builder.entity_type,
                tags_to_sql(&builder.tags)?,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve one of the tenant's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the tenant's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    tenant: &TenantId,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, description, amount, date, kind, category_id, is_fixed, is_paid, entity_type, tags
             FROM \"transaction\" WHERE id = :id AND tenant_id = :tenant_id",
        )?
        .query_row(
            rusqlite::named_params! { ":id": id, ":tenant_id": tenant },
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the tenant's transactions dated within `period`, newest first.
///
/// Ties on the date are broken by ID, newest first. When `entity_type` is
/// `None` both personal and business transactions are returned.
pub fn get_transactions_in_period(
    tenant: &TenantId,
    period: MonthPeriod,
    entity_type: Option<EntityType>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, kind, category_id, is_fixed, is_paid, entity_type, tags
             FROM \"transaction\"
             WHERE tenant_id = :tenant_id
                AND date BETWEEN :start AND :end
                AND (:entity_type IS NULL OR entity_type = :entity_type)
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            rusqlite::named_params! {
                ":tenant_id": tenant,
                ":start": period.start(),
                ":end": period.end(),
                ":entity_type": entity_type,
            },
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Overwrite the editable fields of one of the tenant's transactions.
///
/// # Errors
/// This function will return a:
/// - validation error if the new fields are invalid,
/// - or [Error::UpdateMissingTransaction] if the transaction does not belong to the tenant,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    tenant: &TenantId,
    id: TransactionId,
    update: &TransactionUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    validate_fields(&update.description, update.amount)?;
    validate_category(tenant, update.category_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
        SET \
            description = ?1, \
            amount = ?2, \
            date = ?3, \
            kind = ?4, \
            category_id = ?5, \
            is_fixed = ?6, \
            entity_type = ?7 \
        WHERE id = ?8 AND tenant_id = ?9;",
        rusqlite::params![
            update.description.trim(),
            to_sql_text(update.amount),
            update.date,
            update.kind,
            update.category_id,
            update.is_fixed,
            update.entity_type,
            id,
            tenant,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Set the settlement status of one of the tenant's transactions.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if the transaction does not belong to the tenant.
pub fn set_paid(
    tenant: &TenantId,
    id: TransactionId,
    is_paid: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET is_paid = ?1 WHERE id = ?2 AND tenant_id = ?3;",
        rusqlite::params![is_paid, id, tenant],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete one of the tenant's transactions.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not belong to the tenant.
pub fn delete_transaction(
    tenant: &TenantId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND tenant_id = ?2;",
        rusqlite::params![id, tenant],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Whether the tenant already has a transaction with this description, amount and date.
///
/// Amounts are compared as decimals so that "50" and "50.00" match.
pub fn has_matching_transaction(
    tenant: &TenantId,
    description: &str,
    amount: Decimal,
    date: LedgerDate,
    connection: &Connection,
) -> Result<bool, Error> {
    let mut statement = connection.prepare(
        "SELECT amount FROM \"transaction\"
         WHERE tenant_id = :tenant_id AND description = :description AND date = :date",
    )?;
    let amounts = statement.query_map(
        rusqlite::named_params! {
            ":tenant_id": tenant,
            ":description": description,
            ":date": date,
        },
        |row| get_decimal(row, 0),
    )?;

    for maybe_amount in amounts {
        if maybe_amount? == amount {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Get the number of transactions the tenant has.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(tenant: &TenantId, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE tenant_id = ?1;",
            [tenant],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tenant_id TEXT NOT NULL,
                description TEXT NOT NULL,
                amount TEXT NOT NULL,
                date TEXT NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                category_id INTEGER,
                is_fixed INTEGER NOT NULL DEFAULT 0,
                is_paid INTEGER NOT NULL DEFAULT 1,
                entity_type TEXT NOT NULL DEFAULT 'personal' CHECK (entity_type IN ('personal', 'business')),
                tags TEXT NOT NULL DEFAULT '[]',
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Add composite index used by the summary and the recurrence copier.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_tenant_date ON \"transaction\"(tenant_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = get_decimal(row, 2)?;
    let date = row.get(3)?;
    let kind = row.get(4)?;
    let category_id = row.get(5)?;
    let is_fixed = row.get(6)?;
    let is_paid = row.get(7)?;
    let entity_type = row.get(8)?;
    let raw_tags: String = row.get(9)?;
    let tags = serde_json::from_str(&raw_tags).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id,
        description,
        amount,
        date,
        kind,
        category_id,
        is_fixed,
        is_paid,
        entity_type,
        tags,
    })
}

fn tags_to_sql(tags: &[String]) -> Result<String, rusqlite::Error> {
    serde_json::to_string(tags).map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    use crate::{
        Error,
        category::{CategoryName, create_category},
        db::initialize,
        kind::Kind,
        ledger_date::LedgerDate,
        money::MAX_AMOUNT,
        period::MonthPeriod,
        tenant::TenantId,
        transaction::{
            EntityType, Transaction, TransactionUpdate, count_transactions, create_transaction,
            delete_transaction, get_transaction, get_transactions_in_period,
            has_matching_transaction, set_paid, update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn acme() -> TenantId {
        TenantId::new_unchecked("acme")
    }

    fn ymd(year: i32, month: u8, day: u8) -> LedgerDate {
        LedgerDate::new(year, month, day).unwrap()
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = Decimal::new(1230, 2);

        let transaction = create_transaction(
            &acme(),
            Transaction::build(amount, ymd(2025, 10, 5), "Coffee")
                .tags(vec!["ai".to_owned()]),
            &conn,
        )
        .expect("Could not create transaction");

        assert_eq!(transaction.amount, amount);
        assert_eq!(transaction.kind, Kind::Expense);
        assert!(transaction.is_paid);
        assert_eq!(transaction.entity_type, EntityType::Personal);
        assert_eq!(transaction.tags, vec!["ai".to_owned()]);
        assert_eq!(get_transaction(&acme(), transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn create_fails_on_blank_description() {
        let conn = get_test_connection();

        let result = create_transaction(
            &acme(),
            Transaction::build(Decimal::ONE, ymd(2025, 10, 5), "  "),
            &conn,
        );

        assert_eq!(result, Err(Error::EmptyDescription));
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = get_test_connection();

        for amount in [Decimal::ZERO, Decimal::NEGATIVE_ONE] {
            let result = create_transaction(
                &acme(),
                Transaction::build(amount, ymd(2025, 10, 5), "Refund"),
                &conn,
            );

            assert_eq!(result, Err(Error::NonPositiveAmount));
        }
    }

    #[test]
    fn create_fails_on_amount_above_limit() {
        let conn = get_test_connection();

        for amount in [MAX_AMOUNT + Decimal::new(1, 2), Decimal::MAX] {
            let result = create_transaction(
                &acme(),
                Transaction::build(amount, ymd(2025, 10, 5), "Yacht"),
                &conn,
            );

            assert_eq!(result, Err(Error::AmountTooLarge));
        }
        assert_eq!(count_transactions(&acme(), &conn), Ok(0));
    }

    #[test]
    fn create_accepts_amount_at_limit() {
        let conn = get_test_connection();

        let result = create_transaction(
            &acme(),
            Transaction::build(MAX_AMOUNT, ymd(2025, 10, 5), "Yacht"),
            &conn,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let conn = get_test_connection();
        let category_id = Some(42);

        let result = create_transaction(
            &acme(),
            Transaction::build(Decimal::ONE, ymd(2025, 10, 5), "Coffee").category_id(category_id),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn create_fails_on_other_tenants_category() {
        let conn = get_test_connection();
        let category = create_category(
            &TenantId::new_unchecked("globex"),
            CategoryName::new_unchecked("Groceries"),
            Kind::Expense,
            &conn,
        )
        .unwrap();

        let result = create_transaction(
            &acme(),
            Transaction::build(Decimal::ONE, ymd(2025, 10, 5), "Coffee")
                .category_id(Some(category.id)),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(category.id))));
    }

    #[test]
    fn get_transaction_of_other_tenant_returns_not_found() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            &acme(),
            Transaction::build(Decimal::ONE, ymd(2025, 10, 5), "Coffee"),
            &conn,
        )
        .unwrap();

        let result = get_transaction(&TenantId::new_unchecked("globex"), transaction.id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn period_query_includes_nominal_dates_and_orders_newest_first() {
        let conn = get_test_connection();
        let tenant = acme();
        let dates = [
            ymd(2024, 1, 31),
            ymd(2024, 2, 1),
            ymd(2024, 2, 31),
            ymd(2024, 2, 10),
            ymd(2024, 2, 10),
            ymd(2024, 3, 1),
        ];
        for date in dates {
            create_transaction(&tenant, Transaction::build(Decimal::ONE, date, "x"), &conn)
                .unwrap();
        }

        let got = get_transactions_in_period(
            &tenant,
            MonthPeriod::new(2024, 2).unwrap(),
            None,
            &conn,
        )
        .unwrap();

        let got: Vec<_> = got.iter().map(|t| (t.date.to_string(), t.id)).collect();
        assert_eq!(
            got,
            vec![
                ("2024-02-31".to_owned(), 3),
                ("2024-02-10".to_owned(), 5),
                ("2024-02-10".to_owned(), 4),
                ("2024-02-01".to_owned(), 2),
            ]
        );
    }

    #[test]
    fn period_query_filters_by_entity_type_and_tenant() {
        let conn = get_test_connection();
        let tenant = acme();
        let date = ymd(2024, 2, 10);
        create_transaction(&tenant, Transaction::build(Decimal::ONE, date, "pf"), &conn).unwrap();
        create_transaction(
            &tenant,
            Transaction::build(Decimal::ONE, date, "pj").entity_type(EntityType::Business),
            &conn,
        )
        .unwrap();
        create_transaction(
            &TenantId::new_unchecked("globex"),
            Transaction::build(Decimal::ONE, date, "other"),
            &conn,
        )
        .unwrap();
        let period = MonthPeriod::new(2024, 2).unwrap();

        let business =
            get_transactions_in_period(&tenant, period, Some(EntityType::Business), &conn).unwrap();
        let all = get_transactions_in_period(&tenant, period, None, &conn).unwrap();

        assert_eq!(business.len(), 1);
        assert_eq!(business[0].description, "pj");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn update_overwrites_fields_but_keeps_paid_flag() {
        let conn = get_test_connection();
        let tenant = acme();
        let transaction = create_transaction(
            &tenant,
            Transaction::build(Decimal::ONE, ymd(2025, 1, 1), "old").is_paid(false),
            &conn,
        )
        .unwrap();
        let update = TransactionUpdate {
            description: "new".to_owned(),
            amount: Decimal::new(250, 1),
            date: ymd(2025, 1, 2),
            kind: Kind::Income,
            category_id: None,
            is_fixed: true,
            entity_type: EntityType::Business,
        };

        update_transaction(&tenant, transaction.id, &update, &conn).unwrap();

        let got = get_transaction(&tenant, transaction.id, &conn).unwrap();
        assert_eq!(got.description, "new");
        assert_eq!(got.amount, Decimal::new(25, 0));
        assert_eq!(got.date, ymd(2025, 1, 2));
        assert_eq!(got.kind, Kind::Income);
        assert!(got.is_fixed);
        assert!(!got.is_paid);
        assert_eq!(got.entity_type, EntityType::Business);
    }

    #[test]
    fn update_of_other_tenants_transaction_fails() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            &acme(),
            Transaction::build(Decimal::ONE, ymd(2025, 1, 1), "old"),
            &conn,
        )
        .unwrap();
        let update = TransactionUpdate {
            description: "new".to_owned(),
            amount: Decimal::ONE,
            date: ymd(2025, 1, 2),
            kind: Kind::Expense,
            category_id: None,
            is_fixed: false,
            entity_type: EntityType::Personal,
        };

        let result = update_transaction(
            &TenantId::new_unchecked("globex"),
            transaction.id,
            &update,
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn set_paid_toggles_status() {
        let conn = get_test_connection();
        let tenant = acme();
        let transaction = create_transaction(
            &tenant,
            Transaction::build(Decimal::ONE, ymd(2025, 1, 1), "Rent"),
            &conn,
        )
        .unwrap();

        set_paid(&tenant, transaction.id, false, &conn).unwrap();

        assert!(!get_transaction(&tenant, transaction.id, &conn).unwrap().is_paid);
        assert_eq!(
            set_paid(&tenant, 999, true, &conn),
            Err(Error::UpdateMissingTransaction)
        );
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let tenant = acme();
        let transaction = create_transaction(
            &tenant,
            Transaction::build(Decimal::ONE, ymd(2025, 1, 1), "Rent"),
            &conn,
        )
        .unwrap();

        delete_transaction(&tenant, transaction.id, &conn).unwrap();

        assert_eq!(
            get_transaction(&tenant, transaction.id, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(&tenant, transaction.id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn matching_compares_amounts_as_decimals() {
        let conn = get_test_connection();
        let tenant = acme();
        let date = ymd(2024, 4, 10);
        create_transaction(
            &tenant,
            Transaction::build(Decimal::new(5000, 2), date, "Gym"),
            &conn,
        )
        .unwrap();

        assert!(has_matching_transaction(&tenant, "Gym", Decimal::new(50, 0), date, &conn).unwrap());
        assert!(!has_matching_transaction(&tenant, "Gym", Decimal::new(51, 0), date, &conn).unwrap());
        assert!(
            !has_matching_transaction(
                &TenantId::new_unchecked("globex"),
                "Gym",
                Decimal::new(50, 0),
                date,
                &conn
            )
            .unwrap()
        );
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let tenant = acme();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                &tenant,
                Transaction::build(Decimal::from(i), ymd(2025, 10, 5), "x"),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&tenant, &conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn entity_type_accepts_short_names() {
        assert_eq!(
            serde_json::from_str::<EntityType>("\"pj\"").unwrap(),
            EntityType::Business
        );
        assert_eq!(
            serde_json::from_str::<EntityType>("\"personal\"").unwrap(),
            EntityType::Personal
        );
        assert_eq!(EntityType::Business.label(), "PJ");
    }
}
