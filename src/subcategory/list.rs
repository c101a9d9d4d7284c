//! The subcategory list page.

use std::sync::{Arc, Mutex};

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
        BADGE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
    reference::{CategoryKind, EntityId, NamedEntity, get_all_references},
    subcategory::{
        SubCategory,
        db::{count_transactions_per_subcategory, search_subcategories},
    },
};

/// The state needed for the subcategory list page.
#[derive(Debug, Clone)]
pub struct SubcategoryListPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SubcategoryListPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters of the subcategory list page.
#[derive(Debug, Default, Deserialize)]
pub struct SubcategoryListQuery {
    /// The category filter. Anything that is not an integer is ignored.
    #[serde(default)]
    pub category: String,
    /// The search box.
    #[serde(default)]
    pub q: String,
}

struct SubcategoryRow {
    subcategory: SubCategory,
    transaction_count: u32,
}

/// Render the subcategory list, optionally filtered by category and searched
/// by subcategory or category name.
pub async fn get_subcategory_list_page(
    State(state): State<SubcategoryListPageState>,
    Query(query): Query<SubcategoryListQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category_filter = query.category.trim().parse::<EntityId>().ok();

    let subcategories = search_subcategories(category_filter, &query.q, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve subcategories: {error}"))?;
    let transaction_counts = count_transactions_per_subcategory(&connection).inspect_err(
        |error| tracing::error!("Could not count transactions per subcategory: {error}"),
    )?;
    let categories = get_all_references::<CategoryKind>(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let rows = subcategories
        .into_iter()
        .map(|subcategory| SubcategoryRow {
            transaction_count: *transaction_counts.get(&subcategory.id).unwrap_or(&0),
            subcategory,
        })
        .collect::<Vec<_>>();

    Ok(subcategory_list_view(&rows, &categories, category_filter, &query.q).into_response())
}

fn filter_form(
    categories: &[NamedEntity],
    category_filter: Option<EntityId>,
    search_query: &str,
) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::SUBCATEGORIES_VIEW)
            class="flex flex-wrap gap-2 w-full"
            role="search"
        {
            select name="category" class=(FORM_TEXT_INPUT_STYLE) aria-label="Category"
            {
                option value="" selected[category_filter.is_none()] { "All categories" }

                @for category in categories {
                    option
                        value=(category.id)
                        selected[category_filter == Some(category.id)]
                    {
                        (category.name)
                    }
                }
            }

            input
                type="search"
                name="q"
                value=(search_query)
                placeholder="Search by name or category"
                class=(FORM_TEXT_INPUT_STYLE);

            button type="submit" class="px-4 py-2 bg-blue-500 dark:bg-blue-600 text-white rounded"
            {
                "Filter"
            }
        }
    }
}

fn subcategory_list_view(
    rows: &[SubcategoryRow],
    categories: &[NamedEntity],
    category_filter: Option<EntityId>,
    search_query: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::SUBCATEGORIES_VIEW).into_html();
    let is_filtered = category_filter.is_some() || !search_query.trim().is_empty();

    let table_row = |row: &SubcategoryRow| {
        let subcategory = &row.subcategory;
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_SUBCATEGORY_VIEW, subcategory.id);
        let delete_url = endpoints::format_endpoint(endpoints::SUBCATEGORY, subcategory.id);
        let category_url =
            endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, subcategory.category_id);
        let confirm_message =
            format!("Are you sure you want to delete the subcategory '{subcategory}'?");

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) { (subcategory.name) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    a href=(category_url) class=(LINK_STYLE) { (subcategory.category_name) }
                }

                td class=(TABLE_CELL_STYLE) { (row.transaction_count) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
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
                    h1 class="text-xl font-bold" { "Subcategories" }

                    a href=(endpoints::NEW_SUBCATEGORY_VIEW) class=(LINK_STYLE)
                    {
                        "Add Subcategory"
                    }
                }

                (filter_form(categories, category_filter, search_query))

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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
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
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        @if is_filtered {
                                            "Nothing matches your filters."
                                        } @else {
                                            "No subcategories yet. "
                                            a href=(endpoints::NEW_SUBCATEGORY_VIEW) class=(LINK_STYLE)
                                            {
                                                "Create the first one"
                                            }
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

    base("Subcategories", &content)
}
