//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{AppState, Error, endpoints, reference::FormAction, timezone::local_today};

use super::{
    core::create_transaction,
    form::{
        TransactionFormChoices, TransactionFormData, transaction_form_view,
        validate_transaction_form,
    },
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// Redirects to the transactions page on success. An invalid form comes
/// back with the errors next to the fields and nothing is saved.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let choices = match TransactionFormChoices::load(None, Some(&form.category), &connection) {
        Ok(choices) => choices,
        Err(error) => {
            tracing::error!("Failed to retrieve transaction form choices: {error}");
            return error.into_alert_response();
        }
    };

    let builder = match validate_transaction_form(&form, &choices) {
        Ok(builder) => builder,
        Err(errors) => {
            return transaction_form_view(
                FormAction::Create(endpoints::TRANSACTIONS_API),
                &form,
                &choices,
                &errors,
            )
            .into_response();
        }
    };

    match create_transaction(builder, today, &connection) {
        Ok(transaction) => {
            tracing::debug!("Created transaction {}", transaction.id);
            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            TestData, assert_hx_redirect, assert_valid_html, get_test_connection,
            parse_html_fragment,
        },
        timezone::local_today,
        transaction::{form::TransactionFormData, get_transaction},
    };

    use super::{CreateTransactionState, create_transaction_endpoint};

    fn form(data: &TestData, created_at: &str) -> TransactionFormData {
        TransactionFormData {
            created_at: created_at.to_owned(),
            status: data.status.id.to_string(),
            type_: data.transaction_type.id.to_string(),
            category: data.category.id.to_string(),
            subcategory: data.subcategory.id.to_string(),
            amount: "2500".to_owned(),
            comment: String::new(),
        }
    }

    fn get_state() -> (CreateTransactionState, TestData) {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);

        (
            CreateTransactionState {
                local_timezone: "Europe/Moscow".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            data,
        )
    }

    #[tokio::test]
    async fn creates_transaction_dated_today_when_date_is_blank() {
        let (state, data) = get_state();

        let response =
            create_transaction_endpoint(State(state.clone()), Form(form(&data, ""))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let transaction = get_transaction(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(transaction.created_at, local_today("Europe/Moscow").unwrap());
        assert_eq!(transaction.amount.to_string(), "2500.00");
    }

    #[tokio::test]
    async fn accepts_day_first_dates() {
        let (state, data) = get_state();

        let response =
            create_transaction_endpoint(State(state.clone()), Form(form(&data, "31.01.2023")))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let transaction = get_transaction(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(transaction.created_at.to_string(), "2023-01-31");
    }

    #[tokio::test]
    async fn invalid_form_saves_nothing() {
        let (state, data) = get_state();
        let mut form = form(&data, "yesterday");
        form.amount = "abc".to_owned();

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let errors = html
            .select(&Selector::parse("form p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(errors, ["Enter a valid date.", "Enter a number."]);
        assert!(get_transaction(1, &state.db_connection.lock().unwrap()).is_err());
    }

    #[tokio::test]
    async fn re_rendered_form_keeps_submitted_subcategory_choices() {
        let (state, data) = get_state();
        let mut form = form(&data, "");
        form.amount = String::new();

        let response = create_transaction_endpoint(State(state), Form(form)).await;

        let html = parse_html_fragment(response).await;
        let selected = html
            .select(&Selector::parse("select[name=subcategory] option[selected]").unwrap())
            .map(|option| option.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(selected, ["Avito"]);
    }
}
