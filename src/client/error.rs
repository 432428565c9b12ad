//! Client error types

use thiserror::Error;

/// Errors from talking to the record API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request failed or the response body could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity provider's publishable key is not configured.
    #[error("the SHAWLET_PUBLISHABLE_KEY environment variable must be set")]
    MissingPublishableKey,

    /// The configured API URL is not an absolute http(s) URL.
    #[error("invalid API URL: {0}")]
    InvalidBaseUrl(String),

    /// The operation needs a signed-in user.
    #[error("you must be signed in")]
    NotSignedIn,

    /// The server rejected the session token.
    #[error("authentication required")]
    Unauthorized,

    /// The server refused access to another user's records.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// The record does not exist or belongs to someone else.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server failed to handle the request.
    #[error("server error ({status}): {message}")]
    Server {
        /// The HTTP status code.
        status: u16,
        /// The message from the error envelope, or the raw body.
        message: String,
    },

    /// An edited value could not be applied to a record.
    #[error("invalid value: {0}")]
    InvalidField(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
