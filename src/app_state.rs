//! Implements a struct that holds the state of the admin server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, pagination::PaginationConfig};

/// The state of the admin server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    ///
    /// Used to work out "today" for default transaction dates and date filters.
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Europe/Moscow".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
