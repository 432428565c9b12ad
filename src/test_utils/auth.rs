use jsonwebtoken::{EncodingKey, Header, encode};
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{AppState, SessionClaims, TokenVerifier};

pub(crate) const TEST_AUTH_SECRET: &[u8] = b"shawlet-test-secret";

/// Sign an HS256 session token for `user_id` that expires in an hour.
pub(crate) fn issue_session_token(user_id: &str) -> String {
    let claims = SessionClaims {
        sub: user_id.to_owned(),
        exp: (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp() as u64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_AUTH_SECRET),
    )
    .expect("Could not sign session token")
}

/// The value of an authorization header carrying a session token for `user_id`.
pub(crate) fn bearer(user_id: &str) -> String {
    format!("Bearer {}", issue_session_token(user_id))
}

pub(crate) fn test_app_state(db_connection: Connection) -> AppState {
    AppState::new(
        db_connection,
        TokenVerifier::from_secret(TEST_AUTH_SECRET),
        "Etc/UTC",
    )
    .expect("Could not create app state")
}
