//! Shawlet is a web app for tracking personal income and expenses.
//!
//! This library provides a JSON API for financial records, a dashboard that
//! serves HTML pages, and a client that keeps a signed-in user's records in
//! sync with the API.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod api_error;
mod app_state;
mod auth;
pub mod client;
mod dashboard;
mod db;
pub mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod record;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use api_error::ErrorEnvelope;
pub use app_state::AppState;
pub use auth::{SESSION_COOKIE, SessionClaims, TokenVerifier, UserId};
pub use dashboard::{Flow, Totals, classify, summarize};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use record::{EmptyListPolicy, FinancialRecord, NewRecord, RecordField, RecordId};
pub use routing::build_router;

use crate::{
    alert::{Alert, render_alert},
    internal_server_error::render_internal_server_error,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
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
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a record that does not exist or belongs to another user.
    #[error("tried to update a record that is not in the database")]
    UpdateMissingRecord,

    /// Tried to delete a record that does not exist or belongs to another user.
    #[error("tried to delete a record that is not in the database")]
    DeleteMissingRecord,

    /// A mandatory text field of a record was empty or only whitespace.
    #[error("the {0} cannot be empty")]
    EmptyField(&'static str),

    /// The amount of a record was not a finite number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// A request tried to read or write the records of a different user.
    #[error("the request refers to another user's records")]
    ForeignUser,

    /// The request did not carry a session token.
    #[error("no session token in the request")]
    MissingSessionToken,

    /// The session token could not be verified.
    ///
    /// The string describes why and should only be logged.
    #[error("invalid session token: {0}")]
    InvalidSessionToken(String),

    /// The key for verifying session tokens could not be loaded.
    #[error("invalid session verification key: {0}")]
    InvalidVerificationKey(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
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
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => render_internal_server_error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => render_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                ),
            ),
            Error::EmptyField(field) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Missing value",
                    &format!("The {field} cannot be empty."),
                ),
            ),
            Error::InvalidAmount(amount) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid amount",
                    &format!("\"{amount}\" is not a number. Enter an amount like 12.50."),
                ),
            ),
            Error::UpdateMissingRecord => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update record",
                    "The record could not be found.",
                ),
            ),
            Error::DeleteMissingRecord => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete record",
                    "The record could not be found. \
                    Try refreshing the page to see if the record has already been deleted.",
                ),
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_alert(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
            }
        }
    }
}
