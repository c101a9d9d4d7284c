//! The subcategory edit page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    reference::{CategoryKind, EntityId, FormAction, NamedEntity, get_all_references},
    subcategory::{
        SubCategory,
        db::{get_subcategory, update_subcategory},
        domain::SubCategoryFormData,
        form::{SubCategoryFormErrors, subcategory_form_view, validate_subcategory_form},
    },
};

/// The state needed for the subcategory edit page and endpoint.
#[derive(Debug, Clone)]
pub struct EditSubcategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditSubcategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit page for a subcategory.
pub async fn get_edit_subcategory_page(
    Path(subcategory_id): Path<EntityId>,
    State(state): State<EditSubcategoryState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let subcategory = get_subcategory(subcategory_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve subcategory {subcategory_id}: {error}");
        }
    })?;
    let categories = get_all_references::<CategoryKind>(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(edit_subcategory_view(&subcategory, &categories).into_response())
}

/// Handle the subcategory edit form.
pub async fn update_subcategory_endpoint(
    Path(subcategory_id): Path<EntityId>,
    State(state): State<EditSubcategoryState>,
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

    let update_endpoint = endpoints::format_endpoint(endpoints::SUBCATEGORY, subcategory_id);
    let form_view = |errors: &SubCategoryFormErrors| {
        subcategory_form_view(
            FormAction::Update(&update_endpoint),
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

    match update_subcategory(subcategory_id, name, category_id, &connection)
        .map_err(SubCategoryFormErrors::from_db_error)
    {
        Ok(_) => (
            HxRedirect(endpoints::SUBCATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Ok(errors)) => form_view(&errors),
        Err(Err(error @ Error::UpdateMissing(_))) => error.into_alert_response(),
        Err(Err(error)) => {
            tracing::error!(
                "An unexpected error occurred while updating subcategory {subcategory_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_subcategory_view(subcategory: &SubCategory, categories: &[NamedEntity]) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_SUBCATEGORY_VIEW, subcategory.id);
    let update_endpoint = endpoints::format_endpoint(endpoints::SUBCATEGORY, subcategory.id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form_data = SubCategoryFormData {
        name: subcategory.name.to_string(),
        category: subcategory.category_id.to_string(),
    };
    let form = subcategory_form_view(
        FormAction::Update(&update_endpoint),
        &form_data,
        categories,
        &SubCategoryFormErrors::default(),
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Subcategory" }
            (form)
        }
    };

    base("Edit Subcategory", &content)
}

#[cfg(test)]
mod edit_subcategory_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        Error, endpoints,
        reference::{CategoryKind, EntityName, create_reference},
        subcategory::{create_subcategory, domain::SubCategoryFormData, get_subcategory},
        test_utils::{
            TestData, assert_form_error_message, assert_form_input_with_value,
            assert_form_submit_button_with_text, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, get_test_connection, must_get_form, parse_html_document,
            parse_html_fragment,
        },
    };

    use super::{EditSubcategoryState, get_edit_subcategory_page, update_subcategory_endpoint};

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        let state = EditSubcategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_subcategory_page(Path(data.subcategory.id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::SUBCATEGORY, data.subcategory.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Avito");
        assert_form_submit_button_with_text(&form, "Update Subcategory");
        let selected = form
            .select(&Selector::parse("select[name=category] option[selected]").unwrap())
            .next()
            .expect("No selected category");
        assert_eq!(selected.text().collect::<String>(), "Marketing");
    }

    #[tokio::test]
    async fn edit_page_for_missing_subcategory_is_not_found() {
        let state = EditSubcategoryState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let result = get_edit_subcategory_page(Path(7), State(state)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn update_moves_to_another_category() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        let other = create_reference::<CategoryKind>(EntityName::new_unchecked("Other"), &connection)
            .unwrap();
        let state = EditSubcategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let form = SubCategoryFormData {
            name: "Avito Pro".to_owned(),
            category: other.id.to_string(),
        };

        let response =
            update_subcategory_endpoint(Path(data.subcategory.id), State(state.clone()), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::SUBCATEGORIES_VIEW);
        let updated =
            get_subcategory(data.subcategory.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.name.as_ref(), "Avito Pro");
        assert_eq!(updated.category_name, "Other");
    }

    #[tokio::test]
    async fn update_to_taken_name_shows_error() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        let farpost =
            create_subcategory(EntityName::new_unchecked("Farpost"), data.category.id, &connection)
                .unwrap();
        let state = EditSubcategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let form = SubCategoryFormData {
            name: "Avito".to_owned(),
            category: data.category.id.to_string(),
        };

        let response = update_subcategory_endpoint(Path(farpost.id), State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "A subcategory named 'Avito' already exists.");
    }

    #[tokio::test]
    async fn update_missing_subcategory_is_not_found() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        let state = EditSubcategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let form = SubCategoryFormData {
            name: "Ghost".to_owned(),
            category: data.category.id.to_string(),
        };

        let response = update_subcategory_endpoint(Path(404), State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
