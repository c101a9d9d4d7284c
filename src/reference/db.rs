//! Database operations for statuses, transaction types and categories.

use std::collections::HashMap;

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    reference::{EntityId, EntityName, NamedEntity, ReferenceKind},
    search::{like_pattern, search_terms},
};

/// Initialize the table for the reference kind `K`.
pub fn create_reference_table<K: ReferenceKind>(
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );",
        table = K::TABLE
    ))?;

    Ok(())
}

/// Create a row of kind `K` and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateName] if a row of the same kind already has `name`.
pub fn create_reference<K: ReferenceKind>(
    name: EntityName,
    connection: &Connection,
) -> Result<NamedEntity, Error> {
    connection
        .execute(
            &format!("INSERT INTO {} (name) VALUES (?1);", K::TABLE),
            (name.as_ref(),),
        )
        .map_err(|error| map_unique_violation(error, K::NOUN, name.as_ref()))?;

    let id = connection.last_insert_rowid();

    Ok(NamedEntity { id, name })
}

/// Retrieve a single row of kind `K` by ID.
pub fn get_reference<K: ReferenceKind>(
    id: EntityId,
    connection: &Connection,
) -> Result<NamedEntity, Error> {
    connection
        .prepare(&format!("SELECT id, name FROM {} WHERE id = :id;", K::TABLE))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all rows of kind `K` in the order they were created.
pub fn get_all_references<K: ReferenceKind>(
    connection: &Connection,
) -> Result<Vec<NamedEntity>, Error> {
    connection
        .prepare(&format!("SELECT id, name FROM {} ORDER BY id ASC;", K::TABLE))?
        .query_map([], map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the rows of kind `K` whose name contains every term of `query`,
/// newest first.
///
/// An empty query returns every row.
pub fn search_references<K: ReferenceKind>(
    query: &str,
    connection: &Connection,
) -> Result<Vec<NamedEntity>, Error> {
    let terms = search_terms(query);
    let mut sql = format!("SELECT id, name FROM {} WHERE 1 = 1", K::TABLE);
    let mut params = Vec::with_capacity(terms.len());

    for term in terms {
        params.push(Value::Text(like_pattern(term)));
        sql.push_str(&format!(" AND name LIKE ?{} ESCAPE '\\'", params.len()));
    }

    sql.push_str(" ORDER BY id DESC;");

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params), map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Rename a row of kind `K`.
///
/// # Errors
/// Returns [Error::UpdateMissing] if the row does not exist and
/// [Error::DuplicateName] if another row of the same kind already has `new_name`.
pub fn update_reference<K: ReferenceKind>(
    id: EntityId,
    new_name: EntityName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            &format!("UPDATE {} SET name = ?1 WHERE id = ?2", K::TABLE),
            (new_name.as_ref(), id),
        )
        .map_err(|error| map_unique_violation(error, K::NOUN, new_name.as_ref()))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing(K::NOUN));
    }

    Ok(())
}

/// Delete a row of kind `K`, unless transactions or subcategories still refer to it.
///
/// The dependent rows are counted and the row deleted inside one SQL
/// transaction, so nothing can start referring to the row in between.
///
/// # Errors
/// Returns [Error::DeleteMissing] if the row does not exist and
/// [Error::ProtectedDelete] if the row is still in use.
pub fn delete_reference<K: ReferenceKind>(
    id: EntityId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let entity = match get_reference::<K>(id, &transaction) {
        Ok(entity) => entity,
        Err(Error::NotFound) => return Err(Error::DeleteMissing(K::NOUN)),
        Err(error) => return Err(error),
    };

    let transactions: u32 = transaction.query_row(
        &format!(
            "SELECT COUNT(1) FROM \"transaction\" WHERE {} = ?1",
            K::TRANSACTION_COLUMN
        ),
        [id],
        |row| row.get(0),
    )?;

    let subcategories: u32 = if K::HAS_SUBCATEGORIES {
        transaction.query_row(
            "SELECT COUNT(1) FROM subcategory WHERE category_id = ?1",
            [id],
            |row| row.get(0),
        )?
    } else {
        0
    };

    let protected_delete = || Error::ProtectedDelete {
        entity: K::NOUN,
        name: entity.name.to_string(),
        transactions,
        subcategories,
    };

    if transactions > 0 || subcategories > 0 {
        return Err(protected_delete());
    }

    match transaction.execute(&format!("DELETE FROM {} WHERE id = ?1", K::TABLE), [id]) {
        Ok(_) => {}
        Err(error) => {
            return match Error::from(error) {
                Error::InvalidReference(_) => Err(protected_delete()),
                error => Err(error),
            };
        }
    }

    transaction.commit()?;

    Ok(())
}

/// Count the transactions that refer to each row of kind `K`.
///
/// Rows without transactions are not included in the map.
pub fn count_transactions_per_reference<K: ReferenceKind>(
    connection: &Connection,
) -> Result<HashMap<EntityId, u32>, Error> {
    let result: Result<HashMap<EntityId, u32>, rusqlite::Error> = connection
        .prepare(&format!(
            "SELECT {column}, COUNT(1) FROM \"transaction\" GROUP BY {column}",
            column = K::TRANSACTION_COLUMN
        ))?
        .query_map((), |row| {
            let id = row.get(0)?;
            let count = row.get(1)?;

            Ok((id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

/// Map a unique constraint violation to [Error::DuplicateName], and any
/// other SQL error the usual way.
pub(crate) fn map_unique_violation(
    error: rusqlite::Error,
    entity: &'static str,
    name: &str,
) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateName(entity, name.to_owned()),
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<NamedEntity, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = EntityName::new_unchecked(&raw_name);

    Ok(NamedEntity { id, name })
}
