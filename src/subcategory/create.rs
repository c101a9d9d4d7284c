//! The subcategory create page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    reference::{CategoryKind, FormAction, NamedEntity, get_all_references},
    subcategory::{
        create_subcategory,
        domain::SubCategoryFormData,
        form::{SubCategoryFormErrors, subcategory_form_view, validate_subcategory_form},
    },
};

/// The state needed for the subcategory create page and endpoint.
#[derive(Debug, Clone)]
pub struct CreateSubcategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateSubcategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters of the create page.
#[derive(Debug, Default, Deserialize)]
pub struct NewSubcategoryQuery {
    /// The category to preselect, e.g. when coming from a category's edit page.
    #[serde(default)]
    pub category_id: String,
}

/// Render the subcategory create page.
pub async fn get_new_subcategory_page(
    State(state): State<CreateSubcategoryState>,
    Query(query): Query<NewSubcategoryQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_references::<CategoryKind>(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let form = SubCategoryFormData {
        name: String::new(),
        category: query.category_id,
    };

    Ok(new_subcategory_view(&form, &categories).into_response())
}

/// Handle the subcategory create form.
///
/// Redirects to the subcategory list on success, otherwise re-renders the
/// form with the errors next to the fields.
pub async fn create_subcategory_endpoint(
    State(state): State<CreateSubcategoryState>,
    Form(form): Form<SubCategoryFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let categories = match get_all_references::<CategoryKind>(&connection) {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Failed to retrieve categories: {error}");
            return error.into_alert_response();
        }
    };

    let form_view = |errors: &SubCategoryFormErrors| {
        subcategory_form_view(
            FormAction::Create(endpoints::POST_SUBCATEGORY),
            &form,
            &categories,
            errors,
        )
        .into_response()
    };

    let (name, category_id) = match validate_subcategory_form(&form, &categories) {
        Ok(fields) => fields,
        Err(errors) => return form_view(&errors),
    };

    match create_subcategory(name, category_id, &connection)
        .map_err(SubCategoryFormErrors::from_db_error)
    {
        Ok(_) => (
            HxRedirect(endpoints::SUBCATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Ok(errors)) => form_view(&errors),
        Err(Err(error)) => {
            tracing::error!("An unexpected error occurred while creating a subcategory: {error}");
            error.into_alert_response()
        }
    }
}

fn new_subcategory_view(form: &SubCategoryFormData, categories: &[NamedEntity]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_SUBCATEGORY_VIEW).into_html();
    let form = subcategory_form_view(
        FormAction::Create(endpoints::POST_SUBCATEGORY),
        form,
        categories,
        &SubCategoryFormErrors::default(),
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Add Subcategory" }
            (form)
        }
    };

    base("Add Subcategory", &content)
}
