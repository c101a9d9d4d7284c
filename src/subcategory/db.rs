//! Database operations for subcategories.

use std::collections::HashMap;

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    reference::{EntityId, EntityName, map_unique_violation},
    search::{any_column_like, like_pattern, search_terms},
    subcategory::SubCategory,
};

const SELECT_SUBCATEGORY: &str = "SELECT subcategory.id, subcategory.name, \
    subcategory.category_id, category.name \
    FROM subcategory INNER JOIN category ON category.id = subcategory.category_id";

/// Initialize the subcategory table and indexes.
pub fn create_subcategory_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS subcategory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE RESTRICT,
            UNIQUE(name, category_id)
        );

        CREATE INDEX IF NOT EXISTS idx_subcategory_category ON subcategory(category_id);",
    )?;

    Ok(())
}

/// Create a subcategory under `category_id` and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateName] if the category already has a subcategory
/// called `name`, and [Error::InvalidReference] if the category does not exist.
pub fn create_subcategory(
    name: EntityName,
    category_id: EntityId,
    connection: &Connection,
) -> Result<SubCategory, Error> {
    connection
        .execute(
            "INSERT INTO subcategory (name, category_id) VALUES (?1, ?2);",
            (name.as_ref(), category_id),
        )
        .map_err(|error| map_write_error(error, name.as_ref()))?;

    get_subcategory(connection.last_insert_rowid(), connection)
}

/// Retrieve a single subcategory by ID.
pub fn get_subcategory(id: EntityId, connection: &Connection) -> Result<SubCategory, Error> {
    connection
        .prepare(&format!("{SELECT_SUBCATEGORY} WHERE subcategory.id = :id;"))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the subcategories of a category in the order they were created.
pub fn get_subcategories_for_category(
    category_id: EntityId,
    connection: &Connection,
) -> Result<Vec<SubCategory>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_SUBCATEGORY} WHERE subcategory.category_id = ?1 ORDER BY subcategory.id ASC;"
        ))?
        .query_map([category_id], map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Retrieve every subcategory in the order they were created.
pub fn get_all_subcategories(connection: &Connection) -> Result<Vec<SubCategory>, Error> {
    connection
        .prepare(&format!("{SELECT_SUBCATEGORY} ORDER BY subcategory.id ASC;"))?
        .query_map([], map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Retrieve subcategories for the list page, newest first.
///
/// `category_id` restricts the list to one category. Every term of `query`
/// must appear in either the subcategory name or the category name.
pub fn search_subcategories(
    category_id: Option<EntityId>,
    query: &str,
    connection: &Connection,
) -> Result<Vec<SubCategory>, Error> {
    let mut sql = format!("{SELECT_SUBCATEGORY} WHERE 1 = 1");
    let mut params = Vec::new();

    if let Some(category_id) = category_id {
        params.push(Value::Integer(category_id));
        sql.push_str(&format!(" AND subcategory.category_id = ?{}", params.len()));
    }

    for term in search_terms(query) {
        params.push(Value::Text(like_pattern(term)));
        sql.push_str(" AND ");
        sql.push_str(&any_column_like(
            &["subcategory.name", "category.name"],
            params.len(),
        ));
    }

    sql.push_str(" ORDER BY subcategory.id DESC;");

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params), map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Rename a subcategory and/or move it to another category.
///
/// # Errors
/// Returns [Error::UpdateMissing] if the subcategory does not exist,
/// [Error::DuplicateName] if the target category already has a subcategory
/// called `name`, and [Error::InvalidReference] if the category does not exist.
pub fn update_subcategory(
    id: EntityId,
    name: EntityName,
    category_id: EntityId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE subcategory SET name = ?1, category_id = ?2 WHERE id = ?3",
            (name.as_ref(), category_id, id),
        )
        .map_err(|error| map_write_error(error, name.as_ref()))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing("subcategory"));
    }

    Ok(())
}

/// Delete a subcategory, unless transactions still refer to it.
///
/// # Errors
/// Returns [Error::DeleteMissing] if the subcategory does not exist and
/// [Error::ProtectedDelete] if transactions still use it.
pub fn delete_subcategory(id: EntityId, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let subcategory = match get_subcategory(id, &transaction) {
        Ok(subcategory) => subcategory,
        Err(Error::NotFound) => return Err(Error::DeleteMissing("subcategory")),
        Err(error) => return Err(error),
    };

    let transactions: u32 = transaction.query_row(
        "SELECT COUNT(1) FROM \"transaction\" WHERE subcategory_id = ?1",
        [id],
        |row| row.get(0),
    )?;

    let protected_delete = || Error::ProtectedDelete {
        entity: "subcategory",
        name: subcategory.to_string(),
        transactions,
        subcategories: 0,
    };

    if transactions > 0 {
        return Err(protected_delete());
    }

    if let Err(error) = transaction.execute("DELETE FROM subcategory WHERE id = ?1", [id]) {
        return match Error::from(error) {
            Error::InvalidReference(_) => Err(protected_delete()),
            error => Err(error),
        };
    }

    transaction.commit()?;

    Ok(())
}

/// Count the transactions that refer to each subcategory.
pub fn count_transactions_per_subcategory(
    connection: &Connection,
) -> Result<HashMap<EntityId, u32>, Error> {
    count_grouped(
        "SELECT subcategory_id, COUNT(1) FROM \"transaction\" GROUP BY subcategory_id",
        connection,
    )
}

/// Count the subcategories of each category.
pub fn count_subcategories_per_category(
    connection: &Connection,
) -> Result<HashMap<EntityId, u32>, Error> {
    count_grouped(
        "SELECT category_id, COUNT(1) FROM subcategory GROUP BY category_id",
        connection,
    )
}

fn count_grouped(sql: &str, connection: &Connection) -> Result<HashMap<EntityId, u32>, Error> {
    let result: Result<HashMap<EntityId, u32>, rusqlite::Error> = connection
        .prepare(sql)?
        .query_map((), |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect();

    result.map_err(Error::from)
}

fn map_write_error(error: rusqlite::Error, name: &str) -> Error {
    match map_unique_violation(error, "subcategory", name) {
        Error::InvalidReference(_) => Error::InvalidReference("category"),
        error => error,
    }
}

fn map_row(row: &Row) -> Result<SubCategory, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(SubCategory {
        id: row.get(0)?,
        name: EntityName::new_unchecked(&raw_name),
        category_id: row.get(2)?,
        category_name: row.get(3)?,
    })
}

#[cfg(test)]
mod subcategory_query_tests {
    use std::collections::HashMap;

    use crate::{
        Error,
        reference::{CategoryKind, EntityName, create_reference},
        subcategory::{
            count_subcategories_per_category, count_transactions_per_subcategory,
            create_subcategory, get_subcategories_for_category, get_subcategory,
        },
        test_utils::{TestData, get_test_connection},
    };

    use super::{delete_subcategory, search_subcategories, update_subcategory};

    fn name(name: &str) -> EntityName {
        EntityName::new_unchecked(name)
    }

    #[test]
    fn create_subcategory_loads_category_name() {
        let connection = get_test_connection();
        let category = create_reference::<CategoryKind>(name("Marketing"), &connection).unwrap();

        let subcategory = create_subcategory(name("Avito"), category.id, &connection).unwrap();

        assert_eq!(subcategory.category_id, category.id);
        assert_eq!(subcategory.category_name, "Marketing");
        assert_eq!(get_subcategory(subcategory.id, &connection), Ok(subcategory));
    }

    #[test]
    fn name_is_unique_within_a_category_only() {
        let connection = get_test_connection();
        let marketing = create_reference::<CategoryKind>(name("Marketing"), &connection).unwrap();
        let infrastructure =
            create_reference::<CategoryKind>(name("Infrastructure"), &connection).unwrap();
        create_subcategory(name("Other"), marketing.id, &connection).unwrap();

        assert_eq!(
            create_subcategory(name("Other"), marketing.id, &connection),
            Err(Error::DuplicateName("subcategory", "Other".to_owned()))
        );
        assert!(create_subcategory(name("Other"), infrastructure.id, &connection).is_ok());
    }

    #[test]
    fn create_with_missing_category_is_invalid_reference() {
        let connection = get_test_connection();

        assert_eq!(
            create_subcategory(name("Orphan"), 99, &connection),
            Err(Error::InvalidReference("category"))
        );
    }

    #[test]
    fn lists_subcategories_of_one_category_in_creation_order() {
        let connection = get_test_connection();
        let marketing = create_reference::<CategoryKind>(name("Marketing"), &connection).unwrap();
        let other = create_reference::<CategoryKind>(name("Other"), &connection).unwrap();
        let farpost = create_subcategory(name("Farpost"), marketing.id, &connection).unwrap();
        create_subcategory(name("Misc"), other.id, &connection).unwrap();
        let avito = create_subcategory(name("Avito"), marketing.id, &connection).unwrap();

        let got = get_subcategories_for_category(marketing.id, &connection);

        assert_eq!(got, Ok(vec![farpost, avito]));
    }

    #[test]
    fn unknown_category_has_no_subcategories() {
        let connection = get_test_connection();

        assert_eq!(get_subcategories_for_category(123, &connection), Ok(vec![]));
    }

    #[test]
    fn search_matches_subcategory_or_category_name() {
        let connection = get_test_connection();
        let marketing = create_reference::<CategoryKind>(name("Marketing"), &connection).unwrap();
        let servers = create_reference::<CategoryKind>(name("Servers"), &connection).unwrap();
        let avito = create_subcategory(name("Avito"), marketing.id, &connection).unwrap();
        let vps = create_subcategory(name("VPS"), servers.id, &connection).unwrap();

        assert_eq!(
            search_subcategories(None, "market", &connection),
            Ok(vec![avito.clone()])
        );
        assert_eq!(
            search_subcategories(None, "vps", &connection),
            Ok(vec![vps.clone()])
        );
        assert_eq!(
            search_subcategories(Some(servers.id), "", &connection),
            Ok(vec![vps.clone()])
        );
        assert_eq!(
            search_subcategories(None, "", &connection),
            Ok(vec![vps, avito])
        );
    }

    #[test]
    fn update_moves_subcategory_to_another_category() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        let other = create_reference::<CategoryKind>(name("Other"), &connection).unwrap();

        update_subcategory(data.subcategory.id, name("Renamed"), other.id, &connection).unwrap();

        let updated = get_subcategory(data.subcategory.id, &connection).unwrap();
        assert_eq!(updated.name, name("Renamed"));
        assert_eq!(updated.category_id, other.id);
    }

    #[test]
    fn update_missing_subcategory_returns_update_missing() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);

        assert_eq!(
            update_subcategory(999, name("Foo"), data.category.id, &connection),
            Err(Error::UpdateMissing("subcategory"))
        );
    }

    #[test]
    fn delete_subcategory_in_use_is_rejected() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        data.insert_transaction("900", &connection);

        let result = delete_subcategory(data.subcategory.id, &connection);

        assert_eq!(
            result,
            Err(Error::ProtectedDelete {
                entity: "subcategory",
                name: data.subcategory.to_string(),
                transactions: 1,
                subcategories: 0,
            })
        );
        assert!(get_subcategory(data.subcategory.id, &connection).is_ok());
    }

    #[test]
    fn delete_unused_subcategory_succeeds() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);

        assert_eq!(delete_subcategory(data.subcategory.id, &connection), Ok(()));
        assert_eq!(
            delete_subcategory(data.subcategory.id, &connection),
            Err(Error::DeleteMissing("subcategory"))
        );
    }

    #[test]
    fn counts_per_subcategory_and_category() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        data.insert_transaction("1", &connection);

        assert_eq!(
            count_transactions_per_subcategory(&connection),
            Ok(HashMap::from([(data.subcategory.id, 1)]))
        );
        assert_eq!(
            count_subcategories_per_category(&connection),
            Ok(HashMap::from([(data.category.id, 1)]))
        );
    }
}
