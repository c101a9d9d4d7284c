//! The subcategory delete endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, reference::EntityId, subcategory::db::delete_subcategory,
};

/// The state needed for deleting a subcategory.
#[derive(Debug, Clone)]
pub struct DeleteSubcategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSubcategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle deleting a subcategory. Subcategories used by transactions are kept.
pub async fn delete_subcategory_endpoint(
    Path(subcategory_id): Path<EntityId>,
    State(state): State<DeleteSubcategoryEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_subcategory(subcategory_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Subcategory deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::DeleteMissing(_) | Error::ProtectedDelete { .. })) => {
            tracing::info!("Refused to delete subcategory {subcategory_id}: {error}");
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting subcategory {subcategory_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
