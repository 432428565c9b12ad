use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    api_error::{DELETE_FAILED, record_not_found},
    auth::UserId,
    db::lock_connection,
    record::{RecordId, RecordStoreState, delete_record},
};

/// A route handler for deleting one of the signed-in user's records.
///
/// Responds with the deleted record, or 404 if the user has no record with that ID.
pub async fn delete_record_endpoint(
    State(state): State<RecordStoreState>,
    Extension(session_user): Extension<UserId>,
    record_id: Result<Path<RecordId>, PathRejection>,
) -> Response {
    let Ok(Path(record_id)) = record_id else {
        return record_not_found();
    };

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_api_response(DELETE_FAILED),
    };

    match delete_record(record_id, &session_user, &connection) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error.into_api_response(DELETE_FAILED),
    }
}
