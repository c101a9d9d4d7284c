//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{Error, amount::Amount, reference::EntityId};

// ============================================================================
// MODELS
// ============================================================================

/// A single cash flow event: money that came in or went out on a given day.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: EntityId,
    /// The day the transaction happened. Set once at creation.
    pub created_at: Date,
    /// The ID of the status, e.g. "Business".
    pub status_id: EntityId,
    /// The ID of the transaction type, e.g. "Expense".
    pub type_id: EntityId,
    /// The ID of the category, e.g. "Marketing".
    pub category_id: EntityId,
    /// The ID of the subcategory, e.g. "Avito".
    pub subcategory_id: EntityId,
    /// How much money moved.
    pub amount: Amount,
    /// A free text note, empty when there is none.
    pub comment: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        status_id: EntityId,
        type_id: EntityId,
        category_id: EntityId,
        subcategory_id: EntityId,
        amount: Amount,
    ) -> TransactionBuilder {
        TransactionBuilder {
            created_at: None,
            status_id,
            type_id,
            category_id,
            subcategory_id,
            amount,
            comment: String::new(),
        }
    }
}

/// A builder for creating and updating [Transaction] rows.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::Transaction;
///
/// let transaction = Transaction::build(status_id, type_id, category_id, subcategory_id, amount)
///     .created_at(Some(date!(2025 - 01 - 15)))
///     .comment("Avito promotion");
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TransactionBuilder {
    /// The day the transaction happened.
    ///
    /// `None` means "today" when creating and "keep the stored date" when
    /// updating.
    pub created_at: Option<Date>,
    pub status_id: EntityId,
    pub type_id: EntityId,
    pub category_id: EntityId,
    pub subcategory_id: EntityId,
    pub amount: Amount,
    pub comment: String,
}

impl TransactionBuilder {
    /// Set the date of the transaction.
    pub fn created_at(mut self, created_at: Option<Date>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the comment of the transaction.
    pub fn comment(mut self, comment: &str) -> Self {
        comment.clone_into(&mut self.comment);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION: &str = "SELECT id, created_at, status_id, type_id, category_id, \
    subcategory_id, amount, comment FROM \"transaction\"";

/// Create a new transaction in the database from a builder.
///
/// A builder without a date is dated `today`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidReference] if one of the IDs does not refer to a real row,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" \
                (created_at, status_id, type_id, category_id, subcategory_id, amount, comment) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             RETURNING id, created_at, status_id, type_id, category_id, subcategory_id, amount, comment",
        )?
        .query_row(
            (
                builder.created_at.unwrap_or(today),
                builder.status_id,
                builder.type_id,
                builder.category_id,
                builder.subcategory_id,
                builder.amount,
                builder.comment,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: EntityId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Overwrite the transaction `id` with the values in `builder`.
///
/// The stored date is kept when the builder has none.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissing] if `id` does not refer to a valid transaction,
/// - [Error::InvalidReference] if one of the IDs does not refer to a real row,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: EntityId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET \
            created_at = COALESCE(?1, created_at), \
            status_id = ?2, \
            type_id = ?3, \
            category_id = ?4, \
            subcategory_id = ?5, \
            amount = ?6, \
            comment = ?7 \
        WHERE id = ?8",
        (
            builder.created_at,
            builder.status_id,
            builder.type_id,
            builder.category_id,
            builder.subcategory_id,
            builder.amount,
            builder.comment,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing("transaction"));
    }

    Ok(())
}

/// Delete the transaction `id`.
///
/// # Errors
/// Returns [Error::DeleteMissing] if `id` does not refer to a valid transaction.
pub fn delete_transaction(id: EntityId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing("transaction"));
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                status_id INTEGER NOT NULL REFERENCES status(id) ON DELETE RESTRICT,
                type_id INTEGER NOT NULL REFERENCES transaction_type(id) ON DELETE RESTRICT,
                category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE RESTRICT,
                subcategory_id INTEGER NOT NULL REFERENCES subcategory(id) ON DELETE RESTRICT,
                amount INTEGER NOT NULL,
                comment TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    // The list page filters and orders by date and amount.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_created_at ON \"transaction\"(created_at);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_amount ON \"transaction\"(amount);",
        (),
    )?;

    for column in ["status_id", "type_id", "category_id", "subcategory_id"] {
        connection.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_transaction_{column} ON \"transaction\"({column});"
            ),
            (),
        )?;
    }

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        created_at: row.get(1)?,
        status_id: row.get(2)?,
        type_id: row.get(3)?,
        category_id: row.get(4)?,
        subcategory_id: row.get(5)?,
        amount: row.get(6)?,
        comment: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        amount::Amount,
        test_utils::{TestData, get_test_connection},
    };

    use super::{
        Transaction, TransactionBuilder, create_transaction, delete_transaction, get_transaction,
        update_transaction,
    };

    fn amount(text: &str) -> Amount {
        text.parse().unwrap()
    }

    fn builder(data: &TestData, value: &str) -> TransactionBuilder {
        Transaction::build(
            data.status.id,
            data.transaction_type.id,
            data.category.id,
            data.subcategory.id,
            amount(value),
        )
    }

    #[test]
    fn create_without_date_uses_today() {
        let conn = get_test_connection();
        let data = TestData::insert(&conn);
        let today = date!(2025 - 03 - 08);

        let transaction = create_transaction(builder(&data, "1500.5"), today, &conn).unwrap();

        assert_eq!(transaction.created_at, today);
        assert_eq!(transaction.amount, amount("1500.50"));
        assert_eq!(transaction.comment, "");
        assert_eq!(get_transaction(transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn create_keeps_given_date_and_comment() {
        let conn = get_test_connection();
        let data = TestData::insert(&conn);

        let transaction = create_transaction(
            builder(&data, "10")
                .created_at(Some(date!(2023 - 01 - 31)))
                .comment("Promotion"),
            date!(2025 - 03 - 08),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.created_at, date!(2023 - 01 - 31));
        assert_eq!(transaction.comment, "Promotion");
    }

    #[test]
    fn create_fails_on_missing_reference() {
        let conn = get_test_connection();
        let data = TestData::insert(&conn);
        let mut builder = builder(&data, "10");
        builder.status_id = 999;

        let result = create_transaction(builder, date!(2025 - 03 - 08), &conn);

        assert!(matches!(result, Err(Error::InvalidReference(_))));
    }

    #[test]
    fn get_missing_transaction_is_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(1, &conn), Err(Error::NotFound));
    }

    #[test]
    fn update_without_date_keeps_stored_date() {
        let conn = get_test_connection();
        let data = TestData::insert(&conn);
        let transaction = data.insert_transaction("100", &conn);

        update_transaction(
            transaction.id,
            builder(&data, "250").comment("Changed"),
            &conn,
        )
        .unwrap();

        let updated = get_transaction(transaction.id, &conn).unwrap();
        assert_eq!(updated.created_at, transaction.created_at);
        assert_eq!(updated.amount, amount("250"));
        assert_eq!(updated.comment, "Changed");
    }

    #[test]
    fn update_with_date_changes_it() {
        let conn = get_test_connection();
        let data = TestData::insert(&conn);
        let transaction = data.insert_transaction("100", &conn);

        update_transaction(
            transaction.id,
            builder(&data, "100").created_at(Some(date!(2024 - 12 - 31))),
            &conn,
        )
        .unwrap();

        assert_eq!(
            get_transaction(transaction.id, &conn).unwrap().created_at,
            date!(2024 - 12 - 31)
        );
    }

    #[test]
    fn update_missing_transaction() {
        let conn = get_test_connection();
        let data = TestData::insert(&conn);

        assert_eq!(
            update_transaction(42, builder(&data, "1"), &conn),
            Err(Error::UpdateMissing("transaction"))
        );
    }

    #[test]
    fn delete_transaction_once() {
        let conn = get_test_connection();
        let data = TestData::insert(&conn);
        let transaction = data.insert_transaction("100", &conn);

        assert_eq!(delete_transaction(transaction.id, &conn), Ok(()));
        assert_eq!(
            delete_transaction(transaction.id, &conn),
            Err(Error::DeleteMissing("transaction"))
        );
    }
}
