//! Client configuration read from the environment.

use crate::client::{ClientError, ClientResult};

/// The API the client talks to when `SHAWLET_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Settings for connecting to the record API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The API base URL, e.g. "http://127.0.0.1:3000", without a trailing slash.
    pub base_url: String,

    /// The identity provider's publishable key.
    pub publishable_key: String,
}

impl ClientConfig {
    /// Create a configuration for the API at `base_url`.
    ///
    /// # Errors
    /// Returns [ClientError::MissingPublishableKey] if `publishable_key` is
    /// blank or [ClientError::InvalidBaseUrl] if `base_url` is not an
    /// http(s) URL.
    pub fn new(base_url: &str, publishable_key: &str) -> ClientResult<Self> {
        let publishable_key = publishable_key.trim();
        if publishable_key.is_empty() {
            return Err(ClientError::MissingPublishableKey);
        }

        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url.to_owned()));
        }

        Ok(Self {
            base_url: base_url.to_owned(),
            publishable_key: publishable_key.to_owned(),
        })
    }

    /// Read `SHAWLET_PUBLISHABLE_KEY` and `SHAWLET_API_URL` from the environment.
    ///
    /// # Errors
    /// Fails fast with [ClientError::MissingPublishableKey] if the key is
    /// absent or empty.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let publishable_key =
            lookup("SHAWLET_PUBLISHABLE_KEY").ok_or(ClientError::MissingPublishableKey)?;
        let base_url = lookup("SHAWLET_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());

        Self::new(&base_url, &publishable_key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::client::{ClientConfig, ClientError, config::DEFAULT_API_URL};

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn missing_key_fails_fast() {
        let result =
            ClientConfig::from_lookup(lookup_from(&[("SHAWLET_API_URL", DEFAULT_API_URL)]));

        assert!(matches!(result, Err(ClientError::MissingPublishableKey)));
    }

    #[test]
    fn empty_key_fails_fast() {
        let result = ClientConfig::from_lookup(lookup_from(&[("SHAWLET_PUBLISHABLE_KEY", "  ")]));

        assert!(matches!(result, Err(ClientError::MissingPublishableKey)));
    }

    #[test]
    fn defaults_to_local_api() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("SHAWLET_PUBLISHABLE_KEY", "pk_test")]))
                .unwrap();

        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.publishable_key, "pk_test");
    }

    #[test]
    fn trims_trailing_slash() {
        let config = ClientConfig::new("https://api.example.com/", "pk_test").unwrap();

        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn rejects_url_without_scheme() {
        let result = ClientConfig::new("api.example.com", "pk_test");

        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));
    }
}
