use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState,
    api_error::{ADD_FAILED, json_error},
    auth::UserId,
    db::lock_connection,
    record::{RecordPayload, create_record},
};

/// The state needed for creating, replacing and deleting records through the API.
#[derive(Debug, Clone)]
pub struct RecordStoreState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecordStoreState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a record owned by the signed-in user.
///
/// Responds with 201 and the stored record, including its new ID.
pub async fn create_record_endpoint(
    State(state): State<RecordStoreState>,
    Extension(session_user): Extension<UserId>,
    payload: Result<Json<RecordPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::error!("Could not parse the new record: {rejection}");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, ADD_FAILED);
        }
    };

    let new_record = match payload.into_new_record(&session_user) {
        Ok(new_record) => new_record,
        Err(error) => return error.into_api_response(ADD_FAILED),
    };

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_api_response(ADD_FAILED),
    };

    match create_record(new_record, &connection) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error.into_api_response(ADD_FAILED),
    }
}
