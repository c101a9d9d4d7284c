//! Alert fragments for reporting the outcome of htmx requests.
//!
//! Alerts are swapped into the `#alert-container` element that [crate::html::base]
//! places at the bottom of every page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable success or error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// Success with a headline and an explanation.
    #[allow(dead_code)]
    Success { message: String, details: String },
    /// Failure with a headline and an explanation.
    Error { message: String, details: String },
    /// Success with only a headline.
    SuccessSimple { message: String },
    /// Failure with only a headline.
    #[allow(dead_code)]
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, details),
            Alert::Error { message, details } => (true, message, details),
            Alert::SuccessSimple { message } => (false, message, String::new()),
            Alert::ErrorSimple { message } => (true, message, String::new()),
        };

        let container_style = if is_error {
            "flex items-start p-4 mb-4 text-red-800 border border-red-300 \
            rounded bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start p-4 mb-4 text-green-800 border border-green-300 \
            rounded bg-green-50 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html! {
            div role="alert" class=(container_style)
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1 text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-3 text-sm font-bold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn error_alert_shows_message_then_details() {
        let response = Alert::Error {
            message: "Could not delete status".to_owned(),
            details: "It is in use.".to_owned(),
        }
        .into_response();

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let paragraphs = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(paragraphs, ["Could not delete status", "It is in use."]);
    }

    #[tokio::test]
    async fn simple_alert_omits_details() {
        let response = Alert::SuccessSimple {
            message: "Deleted".to_owned(),
        }
        .into_response();

        let html = parse_html_fragment(response).await;
        assert_eq!(html.select(&Selector::parse("p").unwrap()).count(), 1);
    }
}
