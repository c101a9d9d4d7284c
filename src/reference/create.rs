//! Create pages and endpoints for statuses, transaction types and categories.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    reference::{
        EntityName, ReferenceKind, create_reference,
        domain::ReferenceFormData,
        form::{FormAction, reference_form_view},
    },
};

/// The state needed for creating a status, type or category.
#[derive(Debug, Clone)]
pub struct CreateReferenceEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateReferenceEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the create page for the reference kind `K`.
pub async fn get_new_reference_page<K: ReferenceKind>() -> Response {
    new_reference_view::<K>().into_response()
}

/// Handle the create form for the reference kind `K`.
///
/// Redirects to the list page on success. An invalid or duplicate name
/// re-renders the form with the error.
pub async fn create_reference_endpoint<K: ReferenceKind>(
    State(state): State<CreateReferenceEndpointState>,
    Form(form): Form<ReferenceFormData>,
) -> Response {
    let form_view = |error: &Error| {
        reference_form_view::<K>(
            FormAction::Create(K::COLLECTION_API),
            &form.name,
            Some(&error.to_string()),
        )
        .into_response()
    };

    let name = match EntityName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return form_view(&error),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_reference::<K>(name, &connection) {
        Ok(_) => (
            HxRedirect(K::LIST_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateName(..)) => form_view(&error),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a {}: {error}", K::NOUN);

            error.into_alert_response()
        }
    }
}

fn new_reference_view<K: ReferenceKind>() -> Markup {
    let nav_bar = NavBar::new(K::NEW_VIEW).into_html();
    let form = reference_form_view::<K>(FormAction::Create(K::COLLECTION_API), "", None);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Add " (K::SINGULAR) }
            (form)
        }
    };

    base(&format!("Add {}", K::SINGULAR), &content)
}


#[cfg(test)]
mod create_reference_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::IntoResponse};

    use crate::{
        endpoints,
        reference::{
            EntityName, NamedEntity, StatusKind, TransactionTypeKind, create_reference,
            domain::ReferenceFormData, get_reference,
        },
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html,
            get_test_connection, must_get_form, parse_html_fragment,
        },
    };

    use super::{CreateReferenceEndpointState, create_reference_endpoint};

    fn get_state() -> CreateReferenceEndpointState {
        CreateReferenceEndpointState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn can_create_status() {
        let state = get_state();
        let form = ReferenceFormData {
            name: "  Business ".to_owned(),
        };

        let response = create_reference_endpoint::<StatusKind>(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::STATUSES_VIEW);
        assert_eq!(
            get_reference::<StatusKind>(1, &state.db_connection.lock().unwrap()),
            Ok(NamedEntity {
                id: 1,
                name: EntityName::new_unchecked("Business")
            })
        );
    }

    #[tokio::test]
    async fn create_fails_on_empty_name() {
        let state = get_state();
        let form = ReferenceFormData {
            name: "   ".to_owned(),
        };

        let response = create_reference_endpoint::<StatusKind>(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Name cannot be empty");
    }

    #[tokio::test]
    async fn create_fails_on_duplicate_name() {
        let state = get_state();
        create_reference::<TransactionTypeKind>(
            EntityName::new_unchecked("Income"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = ReferenceFormData {
            name: "Income".to_owned(),
        };

        let response =
            create_reference_endpoint::<TransactionTypeKind>(State(state), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "A transaction type named 'Income' already exists");
    }
}
