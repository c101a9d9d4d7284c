//! Database query helpers for the transactions page.

use rusqlite::{Connection, params_from_iter};
use time::Date;

use crate::{Error, amount::Amount, reference::EntityId};

use super::filters::{TransactionFilters, TransactionOrder};

/// The longest comment shown in the list before it is cut short.
const COMMENT_PREVIEW_LENGTH: usize = 50;

const FROM_TRANSACTIONS: &str = "FROM \"transaction\" AS t \
    INNER JOIN status ON status.id = t.status_id \
    INNER JOIN transaction_type ON transaction_type.id = t.type_id \
    INNER JOIN category ON category.id = t.category_id \
    INNER JOIN subcategory ON subcategory.id = t.subcategory_id \
    INNER JOIN category AS subcategory_category ON subcategory_category.id = subcategory.category_id";

/// A transaction with the names of the rows it refers to, for the list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionTableRow {
    pub id: EntityId,
    pub created_at: Date,
    pub status: String,
    pub transaction_type: String,
    pub category: String,
    /// The subcategory as "name (category)".
    pub subcategory: String,
    pub amount: Amount,
    pub comment: String,
}

impl TransactionTableRow {
    /// The comment cut to 50 characters with "..." appended, or "-" when empty.
    pub fn comment_preview(&self) -> String {
        comment_preview(&self.comment)
    }
}

fn comment_preview(comment: &str) -> String {
    if comment.is_empty() {
        return "-".to_owned();
    }

    match comment.char_indices().nth(COMMENT_PREVIEW_LENGTH) {
        Some((cut, _)) => format!("{}...", &comment[..cut]),
        None => comment.to_owned(),
    }
}

/// Count the transactions that match `filters`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn count_matching_transactions(
    filters: &TransactionFilters,
    today: Date,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, params) = filters.where_clause(today);

    let count: i64 = connection
        .prepare(&format!("SELECT COUNT(t.id) {FROM_TRANSACTIONS} {where_clause}"))?
        .query_row(params_from_iter(params), |row| row.get(0))?;

    // COUNT is never negative.
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Get one page of the transactions that match `filters`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub(crate) fn get_transaction_table_rows(
    filters: &TransactionFilters,
    order: TransactionOrder,
    today: Date,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<TransactionTableRow>, Error> {
    let (where_clause, params) = filters.where_clause(today);
    let query = format!(
        "SELECT t.id, t.created_at, status.name, transaction_type.name, category.name, \
            subcategory.name, subcategory_category.name, t.amount, t.comment \
        {FROM_TRANSACTIONS} {where_clause} {} LIMIT {limit} OFFSET {offset}",
        order.order_by_clause()
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), |row| {
            let subcategory: String = row.get(5)?;
            let subcategory_category: String = row.get(6)?;

            Ok(TransactionTableRow {
                id: row.get(0)?,
                created_at: row.get(1)?,
                status: row.get(2)?,
                transaction_type: row.get(3)?,
                category: row.get(4)?,
                subcategory: format!("{subcategory} ({subcategory_category})"),
                amount: row.get(7)?,
                comment: row.get(8)?,
            })
        })?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        reference::{EntityName, StatusKind, create_reference},
        test_utils::{TestData, get_test_connection},
        transaction::{
            Transaction, create_transaction,
            filters::{AmountBucket, DateRangeFilter, TransactionFilters, TransactionOrder},
        },
    };

    use super::{comment_preview, count_matching_transactions, get_transaction_table_rows};

    const TODAY: time::Date = date!(2023 - 02 - 15);

    fn amounts(filters: &TransactionFilters, connection: &Connection) -> Vec<String> {
        get_transaction_table_rows(
            filters,
            TransactionOrder::AmountAscending,
            TODAY,
            100,
            0,
            connection,
        )
        .unwrap()
        .into_iter()
        .map(|row| row.amount.to_string())
        .collect()
    }

    fn insert_dated(data: &TestData, amount: &str, date: time::Date, connection: &Connection) {
        create_transaction(
            Transaction::build(
                data.status.id,
                data.transaction_type.id,
                data.category.id,
                data.subcategory.id,
                amount.parse().unwrap(),
            )
            .created_at(Some(date)),
            TODAY,
            connection,
        )
        .unwrap();
    }

    #[test]
    fn amount_buckets_partition_transactions() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        for amount in ["999.99", "1000", "5000", "10000", "10000.01"] {
            data.insert_transaction(amount, &connection);
        }

        let bucket = |bucket| TransactionFilters {
            amount: Some(bucket),
            ..Default::default()
        };

        assert_eq!(amounts(&bucket(AmountBucket::Small), &connection), ["999.99"]);
        assert_eq!(
            amounts(&bucket(AmountBucket::Medium), &connection),
            ["1000.00", "5000.00", "10000.00"]
        );
        assert_eq!(amounts(&bucket(AmountBucket::Large), &connection), ["10000.01"]);
        assert_eq!(amounts(&TransactionFilters::default(), &connection).len(), 5);
    }

    #[test]
    fn custom_date_range_is_inclusive() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        insert_dated(&data, "1", date!(2022 - 12 - 31), &connection);
        insert_dated(&data, "2", date!(2023 - 01 - 01), &connection);
        insert_dated(&data, "3", date!(2023 - 01 - 31), &connection);
        insert_dated(&data, "4", date!(2023 - 02 - 01), &connection);

        let filters = TransactionFilters {
            date_range: DateRangeFilter::parse("custom", "01.01.2023", "31.01.2023"),
            ..Default::default()
        };
        assert_eq!(amounts(&filters, &connection), ["2.00", "3.00"]);

        let filters = TransactionFilters {
            date_range: DateRangeFilter::parse("custom", "not a date", "31.01.2023"),
            ..Default::default()
        };
        assert_eq!(amounts(&filters, &connection), ["1.00", "2.00", "3.00"]);
    }

    #[test]
    fn filters_by_status() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        let personal =
            create_reference::<StatusKind>(EntityName::new_unchecked("Personal"), &connection)
                .unwrap();
        data.insert_transaction("1", &connection);
        let mut builder = Transaction::build(
            personal.id,
            data.transaction_type.id,
            data.category.id,
            data.subcategory.id,
            "2".parse().unwrap(),
        );
        builder.comment = "personal".to_owned();
        create_transaction(builder, TODAY, &connection).unwrap();

        let filters = TransactionFilters {
            status_id: Some(personal.id),
            ..Default::default()
        };

        assert_eq!(amounts(&filters, &connection), ["2.00"]);
        assert_eq!(count_matching_transactions(&filters, TODAY, &connection), Ok(1));
    }

    #[test]
    fn search_matches_comment_names_and_amount() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        data.insert_transaction("1234.5", &connection);
        let mut builder = Transaction::build(
            data.status.id,
            data.transaction_type.id,
            data.category.id,
            data.subcategory.id,
            "77".parse().unwrap(),
        );
        builder.comment = "Office rent".to_owned();
        create_transaction(builder, TODAY, &connection).unwrap();

        let search = |text: &str| TransactionFilters {
            search: text.to_owned(),
            ..Default::default()
        };

        assert_eq!(amounts(&search("RENT office"), &connection), ["77.00"]);
        assert_eq!(amounts(&search("1234.50"), &connection), ["1234.50"]);
        assert_eq!(amounts(&search("avito"), &connection).len(), 2);
        assert_eq!(amounts(&search("marketing rent"), &connection), ["77.00"]);
        assert!(amounts(&search("salary"), &connection).is_empty());
    }

    #[test]
    fn rows_carry_names_and_order() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        insert_dated(&data, "5", date!(2023 - 01 - 02), &connection);
        insert_dated(&data, "6", date!(2023 - 01 - 03), &connection);

        let rows = get_transaction_table_rows(
            &TransactionFilters::default(),
            TransactionOrder::CreatedAtDescending,
            TODAY,
            1,
            0,
            &connection,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created_at, date!(2023 - 01 - 03));
        assert_eq!(rows[0].status, "Business");
        assert_eq!(rows[0].transaction_type, "Expense");
        assert_eq!(rows[0].category, "Marketing");
        assert_eq!(rows[0].subcategory, "Avito (Marketing)");
    }

    #[test]
    fn comment_preview_truncates_long_comments() {
        assert_eq!(comment_preview(""), "-");
        assert_eq!(comment_preview("short"), "short");

        let fifty = "я".repeat(50);
        assert_eq!(comment_preview(&fifty), fifty);

        let long = format!("{fifty}abc");
        assert_eq!(comment_preview(&long), format!("{fifty}..."));

        // "й" written as "и" plus a combining breve counts as two characters.
        let combining = "и\u{306}".repeat(26);
        assert_eq!(
            comment_preview(&combining),
            format!("{}...", "и\u{306}".repeat(25))
        );
    }
}
