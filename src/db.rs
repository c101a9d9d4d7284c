//! Database set up for the application's SQLite store.

use rusqlite::{Connection, TransactionBehavior, Transaction as SqlTransaction};

use crate::{
    Error,
    reference::{CategoryKind, StatusKind, TransactionTypeKind, create_reference_table},
    subcategory::create_subcategory_table,
    transaction::create_transaction_table,
};

/// Create all of the database tables for the application.
///
/// Foreign key enforcement is switched on for `connection`, since SQLite
/// leaves it off by default and the protective deletes rely on it.
/// Tables are only created if they do not exist yet, so calling this on an
/// existing database is safe.
///
/// # Errors
/// This function may return a [Error::SqlError] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_reference_table::<StatusKind>(&transaction)?;
    create_reference_table::<TransactionTypeKind>(&transaction)?;
    create_reference_table::<CategoryKind>(&transaction)?;
    create_subcategory_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    tracing::debug!("database initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let mut tables = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        tables.retain(|name| name != "sqlite_sequence");

        assert_eq!(
            tables,
            [
                "category",
                "status",
                "subcategory",
                "transaction",
                "transaction_type"
            ]
        );
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        assert!(initialize(&connection).is_ok());
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let foreign_keys: i64 = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }
}
