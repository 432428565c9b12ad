use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    api_error::{UPDATE_FAILED, json_error, record_not_found},
    auth::UserId,
    db::lock_connection,
    record::{RecordId, RecordPayload, RecordStoreState, replace_record},
};

/// A route handler that replaces every field of one of the signed-in user's records.
///
/// Responds with the updated record, or 404 if the user has no record with that ID.
pub async fn update_record_endpoint(
    State(state): State<RecordStoreState>,
    Extension(session_user): Extension<UserId>,
    record_id: Result<Path<RecordId>, PathRejection>,
    payload: Result<Json<RecordPayload>, JsonRejection>,
) -> Response {
    // IDs are integers, anything else cannot name a stored record.
    let Ok(Path(record_id)) = record_id else {
        return record_not_found();
    };

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::error!("Could not parse the updated record {record_id}: {rejection}");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, UPDATE_FAILED);
        }
    };

    let new_record = match payload.into_new_record(&session_user) {
        Ok(new_record) => new_record,
        Err(error) => return error.into_api_response(UPDATE_FAILED),
    };

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_api_response(UPDATE_FAILED),
    };

    match replace_record(record_id, new_record, &connection) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error.into_api_response(UPDATE_FAILED),
    }
}
