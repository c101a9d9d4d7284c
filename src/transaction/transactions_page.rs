//! Defines the route handler for the page that displays transactions as a table.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    date_input::format_display_date,
    endpoints,
    html::{
        BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
    pagination::{
        PaginationConfig, clamp_page, create_pagination_indicators, page_count, pagination_view,
    },
    reference::{
        CategoryKind, NamedEntity, StatusKind, TransactionTypeKind, get_all_references,
    },
    subcategory::{SubCategory, get_all_subcategories},
    timezone::local_today,
};

use super::{
    filters::{AmountBucket, DateRangeFilter, TransactionFilters, TransactionListQuery, TransactionOrder},
    query::{TransactionTableRow, count_matching_transactions, get_transaction_table_rows},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,
    /// The config for splitting the list into pages.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The options of the filter selects.
struct FilterChoices {
    statuses: Vec<NamedEntity>,
    types: Vec<NamedEntity>,
    categories: Vec<NamedEntity>,
    subcategories: Vec<SubCategory>,
}

struct TransactionsViewModel {
    rows: Vec<TransactionTableRow>,
    row_count: u64,
    page: u64,
    page_count: u64,
    order: TransactionOrder,
    query: TransactionListQuery,
    choices: FilterChoices,
}

/// Render the filtered, ordered and paged transaction list.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, Error> {
    let query = params.into_iter().collect::<TransactionListQuery>();
    let today = local_today(&state.local_timezone)?;
    let filters = TransactionFilters::from_query(&query);
    let order = TransactionOrder::parse(&query.o);
    let page_size = state.pagination_config.default_page_size.max(1);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let row_count = count_matching_transactions(&filters, today, &connection)
        .inspect_err(|error| tracing::error!("Could not count transactions: {error}"))?;
    let page_count = page_count(row_count, page_size);
    let page = clamp_page(
        query.page.as_deref(),
        state.pagination_config.default_page,
        page_count,
    );

    let rows = get_transaction_table_rows(
        &filters,
        order,
        today,
        page_size,
        (page - 1) * page_size,
        &connection,
    )
    .inspect_err(|error| tracing::error!("Could not get transaction table rows: {error}"))?;

    let choices = FilterChoices {
        statuses: get_all_references::<StatusKind>(&connection)?,
        types: get_all_references::<TransactionTypeKind>(&connection)?,
        categories: get_all_references::<CategoryKind>(&connection)?,
        subcategories: get_all_subcategories(&connection)?,
    };

    let view_model = TransactionsViewModel {
        rows,
        row_count,
        page,
        page_count,
        order,
        query,
        choices,
    };

    Ok(transactions_view(&view_model, state.pagination_config.max_pages).into_response())
}

/// The URL of the list page for `query`.
fn list_url(query: &TransactionListQuery) -> String {
    match serde_urlencoded::to_string(query) {
        Ok(encoded) if !encoded.is_empty() => format!("{}?{encoded}", endpoints::TRANSACTIONS_VIEW),
        Ok(_) => endpoints::TRANSACTIONS_VIEW.to_owned(),
        Err(error) => {
            tracing::error!("Could not encode transaction list query {query:?}: {error}");
            endpoints::TRANSACTIONS_VIEW.to_owned()
        }
    }
}

fn page_url(query: &TransactionListQuery, page: u64) -> String {
    list_url(&TransactionListQuery {
        page: Some(page.to_string()),
        ..query.clone()
    })
}

/// The URL that orders by `column` or, when already ordered by it, reverses it.
fn order_url(query: &TransactionListQuery, current: TransactionOrder, column: &str) -> String {
    let next = match (column, current) {
        ("created_at", TransactionOrder::CreatedAtDescending) => TransactionOrder::CreatedAtAscending,
        ("created_at", _) => TransactionOrder::CreatedAtDescending,
        (_, TransactionOrder::AmountAscending) => TransactionOrder::AmountDescending,
        _ => TransactionOrder::AmountAscending,
    };

    list_url(&TransactionListQuery {
        o: next.as_query_value().to_owned(),
        page: None,
        ..query.clone()
    })
}

fn order_indicator(current: TransactionOrder, column: &str) -> &'static str {
    match (column, current) {
        ("created_at", TransactionOrder::CreatedAtAscending)
        | ("amount", TransactionOrder::AmountAscending) => " ▲",
        ("created_at", TransactionOrder::CreatedAtDescending)
        | ("amount", TransactionOrder::AmountDescending) => " ▼",
        _ => "",
    }
}

fn filter_select<'a>(
    name: &str,
    label: &str,
    all_label: &str,
    options: impl IntoIterator<Item = (String, &'a str)>,
    selected: &str,
) -> Markup {
    let selected = selected.trim();

    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select id=(name) name=(name) class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_empty()] { (all_label) }

                @for (value, text) in options {
                    option value=(value) selected[value == selected] { (text) }
                }
            }
        }
    }
}

fn entity_options(entities: &[NamedEntity]) -> impl Iterator<Item = (String, &str)> {
    entities
        .iter()
        .map(|entity| (entity.id.to_string(), entity.name.as_ref()))
}

fn filter_form(query: &TransactionListQuery, choices: &FilterChoices) -> Markup {
    let subcategory_labels = choices
        .subcategories
        .iter()
        .map(|subcategory| (subcategory.id.to_string(), subcategory.to_string()))
        .collect::<Vec<_>>();

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid grid-cols-2 lg:grid-cols-4 gap-4 w-full"
            role="search"
        {
            div class="col-span-2 lg:col-span-4"
            {
                label for="q" class=(FORM_LABEL_STYLE) { "Search" }

                input
                    id="q"
                    type="search"
                    name="q"
                    value=(query.q)
                    placeholder="Comment, category, subcategory or amount"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (filter_select(
                "date_range",
                "Date",
                "Any date",
                DateRangeFilter::PRESETS.iter().map(|(value, text)| (value.to_string(), *text)),
                &query.date_range,
            ))

            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "From" }

                input
                    id="start_date"
                    type="text"
                    name="start_date"
                    value=(query.start_date)
                    placeholder="dd.mm.yyyy"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "To" }

                input
                    id="end_date"
                    type="text"
                    name="end_date"
                    value=(query.end_date)
                    placeholder="dd.mm.yyyy"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (filter_select(
                "amount",
                "Amount",
                "Any amount",
                AmountBucket::ALL.iter().map(|(_, value, text)| (value.to_string(), *text)),
                &query.amount,
            ))

            (filter_select("status", "Status", "All statuses", entity_options(&choices.statuses), &query.status))
            (filter_select("type", "Type", "All types", entity_options(&choices.types), &query.type_))
            (filter_select(
                "category",
                "Category",
                "All categories",
                entity_options(&choices.categories),
                &query.category,
            ))
            (filter_select(
                "subcategory",
                "Subcategory",
                "All subcategories",
                subcategory_labels.iter().map(|(value, text)| (value.clone(), text.as_str())),
                &query.subcategory,
            ))

            @if !query.o.is_empty() {
                input type="hidden" name="o" value=(query.o);
            }

            div class="col-span-2 lg:col-span-4 flex gap-4 items-center"
            {
                button type="submit" class="px-4 py-2 bg-blue-500 dark:bg-blue-600 text-white rounded"
                {
                    "Filter"
                }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Reset" }
            }
        }
    }
}

fn transaction_row(row: &TransactionTableRow) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.id);
    let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, row.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction of {} from {}?",
        row.amount.format_amount(),
        format_display_date(row.created_at)
    );

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (format_display_date(row.created_at)) }
            td class=(TABLE_CELL_STYLE) { span class=(BADGE_STYLE) { (row.status) } }
            td class=(TABLE_CELL_STYLE) { (row.transaction_type) }
            td class=(TABLE_CELL_STYLE) { (row.category) }
            td class=(TABLE_CELL_STYLE) { (row.subcategory) }
            td class="px-6 py-4 text-right whitespace-nowrap" { (row.amount.format_amount()) }
            td class=(TABLE_CELL_STYLE) title=(row.comment) { (row.comment_preview()) }
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
    }
}

fn transactions_view(view_model: &TransactionsViewModel, max_pages: u64) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let query = &view_model.query;
    let order = view_model.order;
    let indicators = create_pagination_indicators(view_model.page, view_model.page_count, max_pages);
    let is_filtered = TransactionFilters::from_query(query) != TransactionFilters::default();

    let sortable_header = |column: &str, text: &str| {
        html! {
            th scope="col" class=(TABLE_CELL_STYLE)
            {
                a href=(order_url(query, order, column)) class="hover:underline"
                {
                    (text) (order_indicator(order, column))
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        main class="flex flex-col items-center px-2 lg:px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            section class="space-y-4 w-full lg:max-w-7xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                (filter_form(query, &view_model.choices))

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    (view_model.row_count) " transaction(s)"
                }

                section class="dark:bg-gray-800 w-full overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                (sortable_header("created_at", "Date"))
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Subcategory" }
                                (sortable_header("amount", "Amount"))
                                th scope="col" class=(TABLE_CELL_STYLE) { "Comment" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in &view_model.rows {
                                (transaction_row(row))
                            }

                            @if view_model.rows.is_empty() {
                                tr
                                {
                                    td colspan="8" class="px-6 py-4 text-center"
                                    {
                                        @if is_filtered {
                                            "No transactions match your filters."
                                        } @else {
                                            "No transactions yet. "
                                            a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                                            {
                                                "Add one"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                @if view_model.page_count > 1 {
                    (pagination_view(&indicators, |page| page_url(query, page)))
                }
            }
        }
    };

    base("Transactions", &content)
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        pagination::PaginationConfig,
        test_utils::{
            TestData, assert_content_type, assert_status_ok, assert_valid_html,
            get_test_connection, parse_html_document,
        },
        transaction::{Transaction, create_transaction},
    };

    use super::{
        TransactionListQuery, TransactionOrder, TransactionsViewState, get_transactions_page,
        order_url, page_url,
    };

    fn get_state(connection: Connection, page_size: u64) -> TransactionsViewState {
        TransactionsViewState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Europe/Moscow".to_owned(),
            pagination_config: PaginationConfig {
                default_page_size: page_size,
                ..Default::default()
            },
        }
    }

    fn table_rows(html: &Html) -> Vec<Vec<String>> {
        let row_selector = Selector::parse("tbody tr").unwrap();
        let cell_selector = Selector::parse("td").unwrap();

        html.select(&row_selector)
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect()
    }

    async fn render(state: TransactionsViewState, query: TransactionListQuery) -> Html {
        let params = serde_urlencoded::from_str::<Vec<(String, String)>>(
            &serde_urlencoded::to_string(&query).unwrap(),
        )
        .unwrap();
        let response = get_transactions_page(State(state), Query(params))
            .await
            .unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    #[tokio::test]
    async fn renders_formatted_columns() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        let long_comment = "Ad campaign for the spring collection across every region we sell in";
        create_transaction(
            Transaction::build(
                data.status.id,
                data.transaction_type.id,
                data.category.id,
                data.subcategory.id,
                "1234567.8".parse().unwrap(),
            )
            .created_at(Some(time::macros::date!(2023 - 01 - 31)))
            .comment(long_comment),
            time::macros::date!(2023 - 02 - 01),
            &connection,
        )
        .unwrap();

        let html = render(get_state(connection, 50), TransactionListQuery::default()).await;

        let rows = table_rows(&html);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0][..7],
            [
                "31.01.2023".to_owned(),
                "Business".to_owned(),
                "Expense".to_owned(),
                "Marketing".to_owned(),
                "Avito (Marketing)".to_owned(),
                "1 234 567.80 ₽".to_owned(),
                format!("{}...", &long_comment[..50]),
            ]
        );
    }

    #[tokio::test]
    async fn empty_comment_is_a_dash() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        data.insert_transaction("10", &connection);

        let html = render(get_state(connection, 50), TransactionListQuery::default()).await;

        assert_eq!(table_rows(&html)[0][6], "-");
    }

    #[tokio::test]
    async fn amount_filter_narrows_list() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        for amount in ["500", "5000", "50000"] {
            data.insert_transaction(amount, &connection);
        }

        let html = render(
            get_state(connection, 50),
            TransactionListQuery {
                amount: "large".to_owned(),
                ..Default::default()
            },
        )
        .await;

        let rows = table_rows(&html);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][5], "50 000.00 ₽");
    }

    #[tokio::test]
    async fn unknown_filter_values_show_everything() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        for amount in ["500", "5000"] {
            data.insert_transaction(amount, &connection);
        }

        let html = render(
            get_state(connection, 50),
            TransactionListQuery {
                amount: "gigantic".to_owned(),
                date_range: "someday".to_owned(),
                status: "abc".to_owned(),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(table_rows(&html).len(), 2);
    }

    #[tokio::test]
    async fn pages_are_clamped() {
        let connection = get_test_connection();
        let data = TestData::insert(&connection);
        for amount in ["1", "2", "3"] {
            data.insert_transaction(amount, &connection);
        }

        let html = render(
            get_state(connection, 2),
            TransactionListQuery {
                o: "amount".to_owned(),
                page: Some("99".to_owned()),
                ..Default::default()
            },
        )
        .await;

        let rows = table_rows(&html);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][5], "3.00 ₽");

        let current_page = html
            .select(&Selector::parse("nav.pagination [aria-current=page]").unwrap())
            .next()
            .expect("No current page indicator");
        assert_eq!(current_page.text().collect::<String>(), "2");
    }

    #[tokio::test]
    async fn no_transactions_links_to_create_page() {
        let html = render(
            get_state(get_test_connection(), 50),
            TransactionListQuery::default(),
        )
        .await;

        let link = html
            .select(&Selector::parse("tbody a").unwrap())
            .next()
            .expect("No create link");
        assert_eq!(link.value().attr("href"), Some("/transactions/new"));
    }

    #[test]
    fn page_links_keep_filters() {
        let query = TransactionListQuery {
            amount: "small".to_owned(),
            type_: "2".to_owned(),
            ..Default::default()
        };

        assert_eq!(page_url(&query, 3), "/transactions?amount=small&type=2&page=3");
    }

    #[test]
    fn order_links_toggle_direction_and_reset_page() {
        let query = TransactionListQuery {
            q: "rent".to_owned(),
            page: Some("4".to_owned()),
            ..Default::default()
        };

        assert_eq!(
            order_url(&query, TransactionOrder::CreatedAtDescending, "created_at"),
            "/transactions?q=rent&o=created_at"
        );
        assert_eq!(
            order_url(&query, TransactionOrder::CreatedAtDescending, "amount"),
            "/transactions?q=rent&o=amount"
        );
        assert_eq!(
            order_url(&query, TransactionOrder::AmountAscending, "amount"),
            "/transactions?q=rent&o=-amount"
        );
    }
}
