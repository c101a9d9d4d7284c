//! The 404 page for unknown routes and missing rows.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// The page shown when a route or a requested row does not exist.
pub struct NotFoundPage;

impl IntoResponse for NotFoundPage {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Html(
                error_view(
                    "Not Found",
                    "404",
                    "Page not found.",
                    "Check the address or go back to the transactions list.",
                )
                .into_string(),
            ),
        )
            .into_response()
    }
}

/// Route handler for the router's fallback.
pub async fn get_404_not_found() -> Response {
    NotFoundPage.into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_content_type, assert_valid_html, parse_html_document};

    use super::get_404_not_found;

    #[tokio::test]
    async fn renders_404_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
    }
}
