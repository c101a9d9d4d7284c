//! Edit pages and endpoints for statuses, transaction types and categories.

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
    html::{
        FORM_CONTAINER_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base,
    },
    navigation::NavBar,
    reference::{
        EntityId, EntityName, NamedEntity, ReferenceKind,
        domain::ReferenceFormData,
        form::{FormAction, reference_form_view},
        get_reference, update_reference,
    },
    subcategory::{SubCategory, count_transactions_per_subcategory, get_subcategories_for_category},
};

/// The state needed for the edit pages.
#[derive(Debug, Clone)]
pub struct EditReferencePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditReferencePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a status, type or category.
#[derive(Debug, Clone)]
pub struct UpdateReferenceEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateReferenceEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A subcategory shown on the category edit page.
struct SubcategorySummary {
    subcategory: SubCategory,
    transaction_count: u32,
}

/// Render the edit page for a row of kind `K`.
///
/// For categories the page also lists the category's subcategories.
pub async fn get_edit_reference_page<K: ReferenceKind>(
    Path(id): Path<EntityId>,
    State(state): State<EditReferencePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entity = get_reference::<K>(id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve {} {id}: {error}", K::NOUN);
        }
    })?;

    let subcategories = if K::HAS_SUBCATEGORIES {
        let transaction_counts = count_transactions_per_subcategory(&connection)?;

        get_subcategories_for_category(id, &connection)?
            .into_iter()
            .map(|subcategory| SubcategorySummary {
                transaction_count: *transaction_counts.get(&subcategory.id).unwrap_or(&0),
                subcategory,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(edit_reference_view::<K>(&entity, &subcategories).into_response())
}

/// Handle the edit form for a row of kind `K`.
pub async fn update_reference_endpoint<K: ReferenceKind>(
    Path(id): Path<EntityId>,
    State(state): State<UpdateReferenceEndpointState>,
    Form(form): Form<ReferenceFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(K::ITEM_API, id);
    let form_view = |error: &Error| {
        reference_form_view::<K>(
            FormAction::Update(&update_endpoint),
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

    match update_reference::<K>(id, name, &connection) {
        Ok(_) => (
            HxRedirect(K::LIST_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateName(..)) => form_view(&error),
        Err(error @ Error::UpdateMissing(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating {} {id}: {error}",
                K::NOUN
            );
            error.into_alert_response()
        }
    }
}

fn edit_reference_view<K: ReferenceKind>(
    entity: &NamedEntity,
    subcategories: &[SubcategorySummary],
) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(K::EDIT_VIEW, entity.id);
    let update_endpoint = endpoints::format_endpoint(K::ITEM_API, entity.id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = reference_form_view::<K>(
        FormAction::Update(&update_endpoint),
        entity.name.as_ref(),
        None,
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit " (K::SINGULAR) }
            (form)

            @if K::HAS_SUBCATEGORIES {
                (subcategories_section(entity.id, subcategories))
            }
        }
    };

    base(&format!("Edit {}", K::SINGULAR), &content)
}

fn subcategories_section(category_id: EntityId, subcategories: &[SubcategorySummary]) -> Markup {
    let add_url = format!("{}?category_id={category_id}", endpoints::NEW_SUBCATEGORY_VIEW);

    html! {
        section id="subcategories" class="w-full mt-8 space-y-2"
        {
            header class="flex justify-between items-end"
            {
                h2 class="text-lg font-semibold" { "Subcategories" }
                a href=(add_url) class=(LINK_STYLE) { "Add Subcategory" }
            }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                    }
                }

                tbody
                {
                    @for summary in subcategories {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                a
                                    href=(endpoints::format_endpoint(
                                        endpoints::EDIT_SUBCATEGORY_VIEW,
                                        summary.subcategory.id,
                                    ))
                                    class=(LINK_STYLE)
                                {
                                    (summary.subcategory.name)
                                }
                            }
                            td class=(TABLE_CELL_STYLE) { (summary.transaction_count) }
                        }
                    }

                    @if subcategories.is_empty() {
                        tr
                        {
                            td colspan="2" class="px-6 py-4 text-center" { "No subcategories yet." }
                        }
                    }
                }
            }
        }
    }
}
