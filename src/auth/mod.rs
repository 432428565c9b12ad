//! Session verification for requests made on behalf of a signed-in user.
//!
//! Signing in is handled by an external identity provider. The server only
//! verifies the session tokens it issues and extracts the user ID.

mod identity;
mod middleware;
mod token;

pub use identity::UserId;
pub use middleware::{AUTHENTICATION_REQUIRED, AuthState, api_auth_guard, page_auth_guard};
pub use token::{SESSION_COOKIE, SessionClaims, TokenVerifier};
