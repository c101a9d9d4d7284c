//! Subcategory lookups by category that feed the cascading category and
//! subcategory selects of the transaction form.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::Markup;
use rusqlite::Connection;

use crate::{
    AppState,
    html::choice_options,
    reference::EntityId,
    subcategory::{SubCategory, SubcategoryOption, db::get_subcategories_for_category},
};

/// The state needed for the subcategory lookups.
#[derive(Debug, Clone)]
pub struct SubcategoryLookupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SubcategoryLookupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw query parameters of the lookups, in request order.
///
/// Kept as pairs so that repeated keys never reject the request.
pub type LookupParams = Vec<(String, String)>;

/// The category ID from the query, last value wins.
///
/// The transaction form's select submits it as `category`.
pub fn category_id_param(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .rev()
        .find(|(key, _)| key == "category_id" || key == "category")
        .map(|(_, value)| value.as_str())
}

/// Return the subcategories of the category `category_id` in creation order.
///
/// A missing or non-numeric ID, an unknown category and database failures
/// all give an empty list. Failures are logged.
pub fn lookup_subcategories(
    category_id: Option<&str>,
    connection: &Arc<Mutex<Connection>>,
) -> Vec<SubCategory> {
    let Some(category_id) = category_id.and_then(|id| id.trim().parse::<EntityId>().ok()) else {
        return Vec::new();
    };

    let connection = match connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Vec::new();
        }
    };

    get_subcategories_for_category(category_id, &connection).unwrap_or_else(|error| {
        tracing::error!("Could not look up subcategories of category {category_id}: {error}");
        Vec::new()
    })
}

/// The JSON lookup: an array of `{id, name}` objects.
pub async fn get_subcategories_json(
    State(state): State<SubcategoryLookupState>,
    Query(params): Query<LookupParams>,
) -> Json<Vec<SubcategoryOption>> {
    let subcategories = lookup_subcategories(category_id_param(&params), &state.db_connection);

    Json(subcategories.into_iter().map(SubcategoryOption::from).collect())
}

/// The HTML lookup: the `<option>` elements for the subcategory select.
pub async fn get_subcategory_options(
    State(state): State<SubcategoryLookupState>,
    Query(params): Query<LookupParams>,
) -> Response {
    let subcategories = lookup_subcategories(category_id_param(&params), &state.db_connection);

    subcategory_options_view(&subcategories, "").into_response()
}

/// The `<option>` elements for `subcategories`, with `selected` chosen.
pub fn subcategory_options_view(subcategories: &[SubCategory], selected: &str) -> Markup {
    choice_options(
        subcategories
            .iter()
            .map(|subcategory| (subcategory.id, subcategory.name.as_ref())),
        selected,
    )
}
