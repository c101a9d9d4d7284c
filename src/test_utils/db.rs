use rusqlite::Connection;
use time::macros::date;

use crate::{
    db::initialize,
    reference::{
        CategoryKind, EntityName, NamedEntity, StatusKind, TransactionTypeKind, create_reference,
    },
    subcategory::{SubCategory, create_subcategory},
    transaction::{Transaction, create_transaction},
};

/// An in-memory database with every table created.
#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

/// One row of each reference table, enough to insert a valid transaction.
#[derive(Debug, Clone)]
pub(crate) struct TestData {
    pub status: NamedEntity,
    pub transaction_type: NamedEntity,
    pub category: NamedEntity,
    pub subcategory: SubCategory,
}

impl TestData {
    /// Insert the status "Business", the type "Expense", the category
    /// "Marketing" and its subcategory "Avito".
    #[track_caller]
    pub(crate) fn insert(connection: &Connection) -> Self {
        let status =
            create_reference::<StatusKind>(EntityName::new_unchecked("Business"), connection)
                .expect("Could not create status");
        let transaction_type = create_reference::<TransactionTypeKind>(
            EntityName::new_unchecked("Expense"),
            connection,
        )
        .expect("Could not create transaction type");
        let category =
            create_reference::<CategoryKind>(EntityName::new_unchecked("Marketing"), connection)
                .expect("Could not create category");
        let subcategory =
            create_subcategory(EntityName::new_unchecked("Avito"), category.id, connection)
                .expect("Could not create subcategory");

        Self {
            status,
            transaction_type,
            category,
            subcategory,
        }
    }

    /// Insert a transaction of `amount` roubles dated 2025-01-15 with no comment.
    #[track_caller]
    pub(crate) fn insert_transaction(&self, amount: &str, connection: &Connection) -> Transaction {
        let date = date!(2025 - 01 - 15);
        let builder = Transaction::build(
            self.status.id,
            self.transaction_type.id,
            self.category.id,
            self.subcategory.id,
            amount.parse().expect("Invalid test amount"),
        )
        .created_at(Some(date));

        create_transaction(builder, date, connection).expect("Could not create transaction")
    }
}
