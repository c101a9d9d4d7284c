//! Defines the route handler for the page for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    reference::{EntityId, FormAction},
};

use super::{
    core::{Transaction, get_transaction},
    form::{
        TransactionFormChoices, TransactionFormData, TransactionFormErrors, transaction_form_view,
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a transaction.
///
/// The subcategory select offers the subcategories of the transaction's category.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<EntityId>,
    State(state): State<EditTransactionPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
        }
    })?;

    let choices = TransactionFormChoices::load(Some(transaction.category_id), None, &connection)
        .inspect_err(|error| {
            tracing::error!("Failed to retrieve choices for edit transaction page: {error}")
        })?;

    Ok(edit_transaction_view(&transaction, &choices).into_response())
}

fn edit_transaction_view(transaction: &Transaction, choices: &TransactionFormChoices) -> Markup {
    let edit_endpoint =
        endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let update_endpoint = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = transaction_form_view(
        FormAction::Update(&update_endpoint),
        &TransactionFormData::from(transaction),
        choices,
        &TransactionFormErrors::default(),
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Transaction" }
            (form)
        }
    };

    base("Edit Transaction", &content)
}
