//! Delete endpoints for statuses, transaction types and categories.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    reference::{EntityId, ReferenceKind, delete_reference},
};

/// The state needed for deleting a status, type or category.
#[derive(Debug, Clone)]
pub struct DeleteReferenceEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteReferenceEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle deleting a row of kind `K`.
///
/// Rows that transactions or subcategories still use are kept, and the
/// response is a 409 alert naming what uses them.
pub async fn delete_reference_endpoint<K: ReferenceKind>(
    Path(id): Path<EntityId>,
    State(state): State<DeleteReferenceEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_reference::<K>(id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: format!("{} deleted successfully", K::SINGULAR),
        }
        .into_response(),
        Err(error @ (Error::DeleteMissing(_) | Error::ProtectedDelete { .. })) => {
            tracing::info!("Refused to delete {} {id}: {error}", K::NOUN);
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting {} {id}: {error}",
                K::NOUN
            );
            error.into_alert_response()
        }
    }
}
