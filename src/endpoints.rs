//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/statuses/{id}/edit', use [format_endpoint].

/// The root route which redirects to the transactions page.
pub const ROOT: &str = "/";
/// The page for listing transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The HTML fragment with the `<option>` elements for the subcategory select.
pub const SUBCATEGORY_OPTIONS: &str = "/transactions/subcategory-options";
/// The page for listing statuses.
pub const STATUSES_VIEW: &str = "/statuses";
/// The page for creating a new status.
pub const NEW_STATUS_VIEW: &str = "/statuses/new";
/// The page for editing an existing status.
pub const EDIT_STATUS_VIEW: &str = "/statuses/{id}/edit";
/// The page for listing transaction types.
pub const TYPES_VIEW: &str = "/types";
/// The page for creating a new transaction type.
pub const NEW_TYPE_VIEW: &str = "/types/new";
/// The page for editing an existing transaction type.
pub const EDIT_TYPE_VIEW: &str = "/types/{id}/edit";
/// The page for listing categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{id}/edit";
/// The page for listing subcategories.
pub const SUBCATEGORIES_VIEW: &str = "/subcategories";
/// The page for creating a new subcategory.
pub const NEW_SUBCATEGORY_VIEW: &str = "/subcategories/new";
/// The page for editing an existing subcategory.
pub const EDIT_SUBCATEGORY_VIEW: &str = "/subcategories/{subcategory_id}/edit";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create a status.
pub const POST_STATUS: &str = "/api/statuses";
/// The route to update or delete a status.
pub const STATUS: &str = "/api/statuses/{id}";
/// The route to create a transaction type.
pub const POST_TYPE: &str = "/api/types";
/// The route to update or delete a transaction type.
pub const TYPE: &str = "/api/types/{id}";
/// The route to create a category.
pub const POST_CATEGORY: &str = "/api/categories";
/// The route to update or delete a category.
pub const CATEGORY: &str = "/api/categories/{id}";
/// The route to create a subcategory.
pub const POST_SUBCATEGORY: &str = "/api/subcategories";
/// The route to update or delete a subcategory.
pub const SUBCATEGORY: &str = "/api/subcategories/{subcategory_id}";
/// The JSON lookup of the subcategories of a category, e.g. `?category_id=1`.
pub const SUBCATEGORY_LOOKUP: &str = "/api/subcategories/";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/statuses/{id}/edit', '{id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_static` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::EDIT_TRANSACTION_VIEW,
            endpoints::SUBCATEGORY_OPTIONS,
            endpoints::STATUSES_VIEW,
            endpoints::NEW_STATUS_VIEW,
            endpoints::EDIT_STATUS_VIEW,
            endpoints::TYPES_VIEW,
            endpoints::NEW_TYPE_VIEW,
            endpoints::EDIT_TYPE_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::NEW_CATEGORY_VIEW,
            endpoints::EDIT_CATEGORY_VIEW,
            endpoints::SUBCATEGORIES_VIEW,
            endpoints::NEW_SUBCATEGORY_VIEW,
            endpoints::EDIT_SUBCATEGORY_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::STATIC,
            endpoints::POST_STATUS,
            endpoints::STATUS,
            endpoints::POST_TYPE,
            endpoints::TYPE,
            endpoints::POST_CATEGORY,
            endpoints::CATEGORY,
            endpoints::POST_SUBCATEGORY,
            endpoints::SUBCATEGORY,
            endpoints::SUBCATEGORY_LOOKUP,
            endpoints::TRANSACTIONS_API,
            endpoints::TRANSACTION,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/statuses/{id}/edit", 12);

        assert_eq!(formatted_path, "/statuses/12/edit");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
