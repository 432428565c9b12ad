//! Error responses for the JSON record API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The plain text body sent when a record does not exist or belongs to someone else.
pub const RECORD_NOT_FOUND: &str = "Record not found.";
/// The plain text body sent for an empty list under the legacy empty-list policy.
pub const NO_RECORDS_FOUND: &str = "No records found for the user.";
/// Sent when a user asks for or writes another user's records.
pub const FOREIGN_RECORDS: &str = "You may only access your own records.";

pub const FETCH_FAILED: &str = "An error occurred while fetching records.";
pub const ADD_FAILED: &str = "An error occurred while adding the record.";
pub const UPDATE_FAILED: &str = "An error occurred while updating the record.";
pub const DELETE_FAILED: &str = "An error occurred while deleting the record.";

/// The JSON body of every API error.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    /// A message that is safe to show to the user.
    pub error: String,
}

/// Respond with `{"error": message}`.
pub fn json_error(status_code: StatusCode, message: &str) -> Response {
    (
        status_code,
        Json(ErrorEnvelope {
            error: message.to_owned(),
        }),
    )
        .into_response()
}

pub fn record_not_found() -> Response {
    (StatusCode::NOT_FOUND, RECORD_NOT_FOUND).into_response()
}

impl Error {
    /// Convert the error into an API response.
    ///
    /// Anything that is not a missing record or an access problem is logged
    /// and reported with the generic `failure_message`.
    pub(crate) fn into_api_response(self, failure_message: &str) -> Response {
        match self {
            Error::NotFound | Error::UpdateMissingRecord | Error::DeleteMissingRecord => {
                record_not_found()
            }
            Error::ForeignUser => json_error(StatusCode::FORBIDDEN, FOREIGN_RECORDS),
            error => {
                tracing::error!("{failure_message} {error}");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, failure_message)
            }
        }
    }
}
