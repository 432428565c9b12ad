//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, auth::TokenVerifier, db::initialize, record::EmptyListPolicy};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Verifies the session tokens issued by the identity provider.
    pub token_verifier: TokenVerifier,

    /// Where anonymous users are sent to sign in, if configured.
    pub sign_in_url: Option<String>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// How the API responds when a user has no records.
    pub empty_list_policy: EmptyListPolicy,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        token_verifier: TokenVerifier,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            token_verifier,
            sign_in_url: None,
            local_timezone: local_timezone.to_owned(),
            empty_list_policy: EmptyListPolicy::default(),
        })
    }

    /// Link the sign-in-required page to the identity provider's sign-in page.
    pub fn with_sign_in_url(mut self, sign_in_url: Option<String>) -> Self {
        self.sign_in_url = sign_in_url;
        self
    }

    /// Choose how the API responds when a user has no records.
    pub fn with_empty_list_policy(mut self, empty_list_policy: EmptyListPolicy) -> Self {
        self.empty_list_policy = empty_list_policy;
        self
    }
}
