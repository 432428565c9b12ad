use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api_error::{FETCH_FAILED, NO_RECORDS_FOUND},
    auth::UserId,
    db::lock_connection,
    record::get_records_by_user,
};

/// How to respond when a user has no records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyListPolicy {
    /// 200 OK with an empty JSON array.
    #[default]
    EmptyArray,
    /// 404 Not Found with a plain text message, for older clients.
    NotFound,
}

/// The state needed for listing a user's records.
#[derive(Debug, Clone)]
pub struct ListRecordsState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// How to respond when the user has no records.
    pub empty_list_policy: EmptyListPolicy,
}

impl FromRef<AppState> for ListRecordsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            empty_list_policy: state.empty_list_policy,
        }
    }
}

/// A route handler that returns every record of the signed-in user as JSON.
///
/// `user_id` must match the session user, users cannot read each other's records.
pub async fn list_records_endpoint(
    State(state): State<ListRecordsState>,
    Extension(session_user): Extension<UserId>,
    Path(user_id): Path<String>,
) -> Response {
    if user_id != session_user.as_str() {
        tracing::warn!("User {session_user} tried to list the records of user {user_id}");
        return Error::ForeignUser.into_api_response(FETCH_FAILED);
    }

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_api_response(FETCH_FAILED),
    };

    let records = match get_records_by_user(&session_user, &connection) {
        Ok(records) => records,
        Err(error) => return error.into_api_response(FETCH_FAILED),
    };

    if records.is_empty() && state.empty_list_policy == EmptyListPolicy::NotFound {
        return (StatusCode::NOT_FOUND, NO_RECORDS_FOUND).into_response();
    }

    (StatusCode::OK, Json(records)).into_response()
}
