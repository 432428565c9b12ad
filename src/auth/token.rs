//! Verification of the session tokens issued by the identity provider.

use std::fmt::Debug;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserId};

/// The cookie the identity provider stores the session token in for browsers.
pub const SESSION_COOKIE: &str = "__session";

/// The claims of a session token that the server relies on.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SessionClaims {
    /// The ID of the signed-in user.
    pub sub: String,
    /// The expiry time of the token as a Unix timestamp.
    pub exp: u64,
}

/// Checks the signature and expiry of session tokens and extracts the user ID.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Verify tokens signed with HS256 and a shared `secret`.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// Verify tokens signed with RS256 using the provider's public key.
    ///
    /// # Errors
    /// Returns [Error::InvalidVerificationKey] if `pem` is not an RSA public
    /// key in PEM format.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, Error> {
        let decoding_key = DecodingKey::from_rsa_pem(pem)
            .map_err(|error| Error::InvalidVerificationKey(error.to_string()))?;

        Ok(Self::new(decoding_key, Algorithm::RS256))
    }

    fn new(decoding_key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Provider tokens name the frontend as the audience, which the API does not check.
        validation.validate_aud = false;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify `token` and return the ID of the user it was issued to.
    ///
    /// # Errors
    /// Returns [Error::InvalidSessionToken] if the token is malformed, has a
    /// bad signature, has expired or does not name a user.
    pub fn verify(&self, token: &str) -> Result<UserId, Error> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| Error::InvalidSessionToken(error.to_string()))?;

        let subject = token_data.claims.sub;
        if subject.trim().is_empty() {
            return Err(Error::InvalidSessionToken(
                "the token does not name a user".to_owned(),
            ));
        }
        if subject.trim() != subject {
            return Err(Error::InvalidSessionToken(
                "the subject has surrounding whitespace".to_owned(),
            ));
        }

        Ok(UserId::new(subject))
    }
}

impl Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
