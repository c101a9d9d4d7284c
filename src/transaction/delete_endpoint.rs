//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, reference::EntityId};

use super::core::delete_transaction;

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with an alert.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<EntityId>,
    State(state): State<DeleteTransactionState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => Alert::SuccessSimple {
            message: "Transaction deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ Error::DeleteMissing(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
