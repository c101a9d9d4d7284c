//! Defines the route handler for the page for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    date_input::format_display_date,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    reference::FormAction,
    timezone::local_today,
};

use super::form::{
    TransactionFormChoices, TransactionFormData, TransactionFormErrors, transaction_form_view,
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,
    /// The database connection for loading the select options.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating a transaction, dated today.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let choices = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        TransactionFormChoices::load(None, None, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve choices for new transaction page: {error}")
        })?
    };

    let form = TransactionFormData {
        created_at: format_display_date(today),
        ..Default::default()
    };

    Ok(create_transaction_view(&form, &choices).into_response())
}

fn create_transaction_view(form: &TransactionFormData, choices: &TransactionFormChoices) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = transaction_form_view(
        FormAction::Create(endpoints::TRANSACTIONS_API),
        form,
        choices,
        &TransactionFormErrors::default(),
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Transaction" }
            (form)
        }
    };

    base("Create Transaction", &content)
}
