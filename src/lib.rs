//! Cashflow Admin is a web app for bookkeeping cash flow (ДДС): money movements
//! classified by status, type, category and subcategory.
//!
//! This library provides an administrative interface that directly serves HTML
//! pages, plus a small JSON API used by the transaction form.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxReswap, SwapOption};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod amount;
mod app_state;
mod date_input;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod reference;
mod routing;
mod search;
mod subcategory;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use amount::{Amount, AmountError};
pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use reference::{
    CategoryKind, EntityName, NamedEntity, ReferenceKind, StatusKind, TransactionTypeKind,
    create_reference,
};
pub use routing::build_router;
pub use subcategory::{SubCategory, create_subcategory};
pub use transaction::{Transaction, TransactionBuilder, create_transaction};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundPage};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used as the name of a status, type, category or
    /// subcategory.
    #[error("Name cannot be empty")]
    EmptyName,

    /// The name is longer than the maximum name length.
    #[error("Name cannot be longer than {} characters", reference::MAX_NAME_LENGTH)]
    NameTooLong,

    /// A row with the same name already exists.
    ///
    /// The first field is the lowercase entity noun (e.g. "status"), the
    /// second field is the offending name.
    #[error("A {0} named '{1}' already exists")]
    DuplicateName(&'static str, String),

    /// A foreign key used to create or update a row did not refer to an
    /// existing row.
    ///
    /// The field is the lowercase noun of the referenced entity, or "related
    /// row" when SQLite cannot tell which key failed.
    #[error("the {0} does not exist")]
    InvalidReference(&'static str),

    /// Tried to delete a row that other rows still depend on.
    ///
    /// Statuses, types, categories and subcategories are protected from
    /// deletion while transactions (or, for categories, subcategories) refer
    /// to them.
    #[error(
        "cannot delete {entity} '{name}': it is used by {transactions} transaction(s) and \
        {subcategories} subcategory(ies)"
    )]
    ProtectedDelete {
        /// The lowercase noun of the entity, e.g. "category".
        entity: &'static str,
        /// The name of the row that could not be deleted.
        name: String,
        /// The number of transactions that refer to the row.
        transactions: u32,
        /// The number of subcategories that refer to the row.
        subcategories: u32,
    },

    /// The amount could not be parsed or has too many digits.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a row that does not exist.
    ///
    /// The field is the lowercase entity noun.
    #[error("tried to update a {0} that is not in the database")]
    UpdateMissing(&'static str),

    /// Tried to delete a row that does not exist.
    ///
    /// The field is the lowercase entity noun.
    #[error("tried to delete a {0} that is not in the database")]
    DeleteMissing(&'static str),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidReference("related row"),
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundPage.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for htmx requests.
    ///
    /// The response asks htmx to swap the alert into its target, so an
    /// element targeted with `hx-target-error` keeps its place in the page
    /// regardless of the swap style of the request.
    fn into_alert_response(self) -> Response {
        let (status_code, alert) = self.into_alert();

        (status_code, HxReswap(SwapOption::InnerHtml), alert).into_response()
    }

    fn into_alert(self) -> (StatusCode, Alert) {
        match self {
            Error::ProtectedDelete {
                entity,
                name,
                transactions,
                subcategories,
            } => {
                let mut blockers = Vec::new();
                if transactions > 0 {
                    blockers.push(format!("{transactions} transaction(s)"));
                }
                if subcategories > 0 {
                    blockers.push(format!("{subcategories} subcategory(ies)"));
                }

                (
                    StatusCode::CONFLICT,
                    Alert::Error {
                        message: format!("Could not delete {entity}"),
                        details: format!(
                            "'{name}' is still used by {}. \
                            Reassign or delete those first.",
                            blockers.join(" and ")
                        ),
                    },
                )
            }
            Error::DuplicateName(entity, name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: format!("Duplicate {entity} name"),
                    details: format!(
                        "A {entity} named '{name}' already exists. Choose a different name."
                    ),
                },
            ),
            Error::InvalidReference(entity) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid selection".to_owned(),
                    details: format!("The selected {entity} does not exist."),
                },
            ),
            Error::UpdateMissing(entity) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: format!("Could not update {entity}"),
                    details: format!("The {entity} could not be found."),
                },
            ),
            Error::DeleteMissing(entity) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: format!("Could not delete {entity}"),
                    details: format!(
                        "The {entity} could not be found. \
                        Try refreshing the page to see if it has already been deleted."
                    ),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The requested item could not be found.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        }
    }
}
