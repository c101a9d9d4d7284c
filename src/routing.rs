//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    reference::{
        CategoryKind, ReferenceKind, StatusKind, TransactionTypeKind, create_reference_endpoint,
        delete_reference_endpoint, get_edit_reference_page, get_new_reference_page,
        get_reference_list_page, update_reference_endpoint,
    },
    subcategory::{
        create_subcategory_endpoint, delete_subcategory_endpoint, get_edit_subcategory_page,
        get_new_subcategory_page, get_subcategories_json, get_subcategory_list_page,
        get_subcategory_options, update_subcategory_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_create_transaction_page, get_edit_transaction_page, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(
            endpoints::SUBCATEGORY_OPTIONS,
            get(get_subcategory_options),
        )
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::SUBCATEGORIES_VIEW,
            get(get_subcategory_list_page),
        )
        .route(
            endpoints::NEW_SUBCATEGORY_VIEW,
            get(get_new_subcategory_page),
        )
        .route(
            endpoints::EDIT_SUBCATEGORY_VIEW,
            get(get_edit_subcategory_page),
        )
        .route(
            endpoints::POST_SUBCATEGORY,
            post(create_subcategory_endpoint),
        )
        .route(
            endpoints::SUBCATEGORY,
            put(update_subcategory_endpoint).delete(delete_subcategory_endpoint),
        )
        .route(endpoints::SUBCATEGORY_LOOKUP, get(get_subcategories_json))
        .merge(reference_routes::<StatusKind>())
        .merge(reference_routes::<TransactionTypeKind>())
        .merge(reference_routes::<CategoryKind>())
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The list, create and edit pages and the API routes of the reference kind `K`.
fn reference_routes<K: ReferenceKind>() -> Router<AppState> {
    Router::new()
        .route(K::LIST_VIEW, get(get_reference_list_page::<K>))
        .route(K::NEW_VIEW, get(get_new_reference_page::<K>))
        .route(K::EDIT_VIEW, get(get_edit_reference_page::<K>))
        .route(K::COLLECTION_API, post(create_reference_endpoint::<K>))
        .route(
            K::ITEM_API,
            put(update_reference_endpoint::<K>).delete(delete_reference_endpoint::<K>),
        )
}

/// The root path '/' redirects to the transactions page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}
