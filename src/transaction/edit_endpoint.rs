//! Defines the endpoint for updating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    reference::{EntityId, FormAction},
};

use super::{
    core::{get_transaction, update_transaction},
    form::{
        TransactionFormChoices, TransactionFormData, transaction_form_view,
        validate_transaction_form,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a transaction.
///
/// A blank date keeps the stored one.
pub async fn edit_transaction_endpoint(
    Path(transaction_id): Path<EntityId>,
    State(state): State<EditTransactionState>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let stored = match get_transaction(transaction_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Error::UpdateMissing("transaction").into_alert_response(),
        Err(error) => {
            tracing::error!("Could not retrieve transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    let choices = match TransactionFormChoices::load(
        Some(stored.category_id),
        Some(&form.category),
        &connection,
    ) {
        Ok(choices) => choices,
        Err(error) => {
            tracing::error!("Failed to retrieve transaction form choices: {error}");
            return error.into_alert_response();
        }
    };

    let builder = match validate_transaction_form(&form, &choices) {
        Ok(builder) => builder,
        Err(errors) => {
            let update_endpoint = endpoints::format_endpoint(endpoints::TRANSACTION, transaction_id);
            return transaction_form_view(
                FormAction::Update(&update_endpoint),
                &form,
                &choices,
                &errors,
            )
            .into_response();
        }
    };

    match update_transaction(transaction_id, builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::UpdateMissing(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
