//! The capability the client needs from the identity provider.

use std::sync::RwLock;

use crate::auth::UserId;

/// Tells the client who is signed in and how to prove it to the API.
pub trait IdentityProvider: Send + Sync {
    /// Whether a user is currently signed in.
    fn is_signed_in(&self) -> bool {
        self.current_user_id().is_some()
    }

    /// The ID of the signed-in user, if any.
    fn current_user_id(&self) -> Option<UserId>;

    /// The session token to send to the API, if any.
    fn session_token(&self) -> Option<String>;
}

/// A signed-in user and the session token the identity provider issued them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user.
    pub user_id: UserId,
    /// The signed session token.
    pub token: String,
}

/// An [IdentityProvider] that holds a session obtained elsewhere, e.g. from
/// the environment.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    session: RwLock<Option<Session>>,
}

impl StaticIdentity {
    /// Start with `session`, or signed out if `None`.
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }

    /// Replace the current session.
    pub fn sign_in(&self, session: Session) {
        match self.session.write() {
            Ok(mut current) => *current = Some(session),
            Err(error) => tracing::error!("could not acquire session lock: {error}"),
        }
    }

    /// Forget the current session.
    pub fn sign_out(&self) {
        match self.session.write() {
            Ok(mut current) => *current = None,
            Err(error) => tracing::error!("could not acquire session lock: {error}"),
        }
    }

    fn session(&self) -> Option<Session> {
        self.session
            .read()
            .inspect_err(|error| tracing::error!("could not acquire session lock: {error}"))
            .ok()
            .and_then(|session| session.clone())
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.session().map(|session| session.user_id)
    }

    fn session_token(&self) -> Option<String> {
        self.session().map(|session| session.token)
    }
}
