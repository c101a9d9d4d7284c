//! List pages for statuses, transaction types and categories.

use std::{
    collections::HashMap,
    marker::PhantomData,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    html::{
        BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links, search_form,
    },
    navigation::NavBar,
    reference::{EntityId, NamedEntity, ReferenceKind, count_transactions_per_reference},
    subcategory::count_subcategories_per_category,
};

use super::db::search_references;

/// The state needed for the reference list pages.
#[derive(Debug, Clone)]
pub struct ReferenceListPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReferenceListPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters of a reference list page.
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceListQuery {
    /// The search box.
    #[serde(default)]
    pub q: String,
}

/// A row of a reference list with its dependent row counts.
struct ReferenceRow<K> {
    entity: NamedEntity,
    transaction_count: u32,
    subcategory_count: Option<u32>,
    kind: PhantomData<K>,
}

impl<K: ReferenceKind> ReferenceRow<K> {
    fn edit_url(&self) -> String {
        endpoints::format_endpoint(K::EDIT_VIEW, self.entity.id)
    }

    fn delete_url(&self) -> String {
        endpoints::format_endpoint(K::ITEM_API, self.entity.id)
    }

    fn confirm_message(&self) -> String {
        format!(
            "Are you sure you want to delete the {} '{}'?",
            K::NOUN,
            self.entity.name
        )
    }
}

/// Render the list page for the reference kind `K`, with transaction counts
/// and, for categories, subcategory counts.
pub async fn get_reference_list_page<K: ReferenceKind>(
    State(state): State<ReferenceListPageState>,
    Query(query): Query<ReferenceListQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entities = search_references::<K>(&query.q, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve {}: {error}", K::PLURAL))?;

    let transaction_counts = count_transactions_per_reference::<K>(&connection).inspect_err(
        |error| tracing::error!("Could not count transactions per {}: {error}", K::NOUN),
    )?;

    let subcategory_counts: Option<HashMap<EntityId, u32>> = if K::HAS_SUBCATEGORIES {
        Some(
            count_subcategories_per_category(&connection).inspect_err(|error| {
                tracing::error!("Could not count subcategories per category: {error}")
            })?,
        )
    } else {
        None
    };

    let rows = entities
        .into_iter()
        .map(|entity| ReferenceRow::<K> {
            transaction_count: *transaction_counts.get(&entity.id).unwrap_or(&0),
            subcategory_count: subcategory_counts
                .as_ref()
                .map(|counts| *counts.get(&entity.id).unwrap_or(&0)),
            entity,
            kind: PhantomData,
        })
        .collect::<Vec<_>>();

    Ok(reference_list_view(&rows, &query.q).into_response())
}

fn reference_list_view<K: ReferenceKind>(rows: &[ReferenceRow<K>], search_query: &str) -> Markup {
    let nav_bar = NavBar::new(K::LIST_VIEW).into_html();
    let column_count = if K::HAS_SUBCATEGORIES { 4 } else { 3 };

    let table_row = |row: &ReferenceRow<K>| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) { (row.entity.name) }
                }

                @if let Some(subcategory_count) = row.subcategory_count {
                    td class=(TABLE_CELL_STYLE) { (subcategory_count) }
                }

                td class=(TABLE_CELL_STYLE) { (row.transaction_count) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url(),
                            &row.delete_url(),
                            &row.confirm_message(),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (K::PLURAL) }

                    a href=(K::NEW_VIEW) class=(LINK_STYLE)
                    {
                        "Add " (K::SINGULAR)
                    }
                }

                (search_form(K::LIST_VIEW, search_query, "Search by name"))

                section class="dark:bg-gray-800 w-full overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                @if K::HAS_SUBCATEGORIES {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Subcategories" }
                                }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan=(column_count)
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        @if search_query.is_empty() {
                                            "No " (K::PLURAL.to_lowercase()) " yet. "
                                            a href=(K::NEW_VIEW) class=(LINK_STYLE)
                                            {
                                                "Create the first one"
                                            }
                                        } @else {
                                            "Nothing matches your search."
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base(K::PLURAL, &content)
}
