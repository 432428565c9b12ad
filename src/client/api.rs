//! HTTP client for the record API.

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    api_error::ErrorEnvelope,
    auth::UserId,
    client::{ClientConfig, ClientError, ClientResult},
    endpoints::{self, format_endpoint},
    record::{FinancialRecord, NewRecord, RecordId},
};

/// Calls the four record endpoints with a session token.
#[derive(Debug, Clone)]
pub struct RecordApi {
    client: Client,
    base_url: String,
}

impl RecordApi {
    /// Create a client for the API described by `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The list URL with `user_id` percent-encoded as a single path segment.
    fn records_by_user_url(&self, user_id: &UserId) -> ClientResult<Url> {
        let invalid_base_url = || ClientError::InvalidBaseUrl(self.base_url.clone());

        let mut url = Url::parse(&self.url(&format_endpoint(endpoints::RECORDS_BY_USER, "")))
            .map_err(|_| invalid_base_url())?;

        url.path_segments_mut()
            .map_err(|_| invalid_base_url())?
            .pop_if_empty()
            .push(user_id.as_str());

        Ok(url)
    }

    /// Get every record of `user_id`.
    ///
    /// A 404 from servers that report an empty list as not found is treated
    /// as an empty list.
    pub async fn list_by_user(
        &self,
        user_id: &UserId,
        token: &str,
    ) -> ClientResult<Vec<FinancialRecord>> {
        let response = self
            .client
            .get(self.records_by_user_url(user_id)?)
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        handle_response(response).await
    }

    /// Store `record` and return it with its assigned ID.
    pub async fn create(&self, record: &NewRecord, token: &str) -> ClientResult<FinancialRecord> {
        let response = self
            .client
            .post(self.url(endpoints::FINANCIAL_RECORDS))
            .bearer_auth(token)
            .json(record)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Replace every field of the record `id` with `record`.
    pub async fn replace(
        &self,
        id: RecordId,
        record: &NewRecord,
        token: &str,
    ) -> ClientResult<FinancialRecord> {
        let response = self
            .client
            .put(self.url(&format_endpoint(endpoints::FINANCIAL_RECORD, id)))
            .bearer_auth(token)
            .json(record)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Delete the record `id` and return it.
    pub async fn delete(&self, id: RecordId, token: &str) -> ClientResult<FinancialRecord> {
        let response = self
            .client
            .delete(self.url(&format_endpoint(endpoints::FINANCIAL_RECORD, id)))
            .bearer_auth(token)
            .send()
            .await?;

        handle_response(response).await
    }
}

/// Decode a successful response or map the status to a [ClientError].
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await?;
        // JSON failures carry an envelope, the 404s are plain text.
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|envelope| envelope.error)
            .unwrap_or(text);

        return match status {
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            _ => Err(ClientError::Server {
                status: status.as_u16(),
                message,
            }),
        };
    }

    response.json().await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        api_error::{FOREIGN_RECORDS, RECORD_NOT_FOUND},
        auth::UserId,
        client::{ClientConfig, ClientError, RecordApi},
        record::{EmptyListPolicy, FinancialRecord},
        test_utils::{issue_session_token, spawn_test_server},
    };

    async fn get_api(policy: EmptyListPolicy) -> RecordApi {
        let base_url = spawn_test_server(policy).await;
        RecordApi::new(&ClientConfig::new(&base_url, "pk_test").unwrap())
    }

    #[tokio::test]
    async fn create_and_list() {
        let api = get_api(EmptyListPolicy::EmptyArray).await;
        let token = issue_session_token("u1");
        let new_record = FinancialRecord::build(
            UserId::new("u1"),
            1000.0,
            datetime!(2025-03-01 09:30 UTC),
            "pay",
        )
        .category("Salary")
        .payment_method("bank");

        let created = api.create(&new_record, &token).await.unwrap();
        let records = api.list_by_user(&UserId::new("u1"), &token).await.unwrap();

        assert_eq!(records, vec![created]);
    }

    #[tokio::test]
    async fn lists_records_of_user_ids_with_reserved_characters() {
        let api = get_api(EmptyListPolicy::EmptyArray).await;

        for raw_id in ["org/u1", "u1#x", "u1?x", "u1 50%"] {
            let user_id = UserId::new(raw_id);
            let token = issue_session_token(raw_id);
            let new_record = FinancialRecord::build(
                user_id.clone(),
                25.0,
                datetime!(2025-03-02 12:00 UTC),
                "lunch",
            )
            .category("Food")
            .payment_method("Cash");

            let created = api.create(&new_record, &token).await.unwrap();
            let records = api.list_by_user(&user_id, &token).await.unwrap();

            assert_eq!(records, vec![created], "wrong records for {raw_id:?}");
        }
    }

    #[tokio::test]
    async fn legacy_not_found_is_empty_list() {
        let api = get_api(EmptyListPolicy::NotFound).await;

        let records = api
            .list_by_user(&UserId::new("u1"), &issue_session_token("u1"))
            .await
            .unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn maps_forbidden_with_envelope_message() {
        let api = get_api(EmptyListPolicy::EmptyArray).await;

        let result = api
            .list_by_user(&UserId::new("u2"), &issue_session_token("u1"))
            .await;

        match result {
            Err(ClientError::Forbidden(message)) => assert_eq!(message, FOREIGN_RECORDS),
            other => panic!("want forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn maps_invalid_token_to_unauthorized() {
        let api = get_api(EmptyListPolicy::EmptyArray).await;

        let result = api.list_by_user(&UserId::new("u1"), "not-a-token").await;

        assert!(matches!(result, Err(ClientError::Unauthorized)));
    }

    #[tokio::test]
    async fn maps_missing_record_to_not_found() {
        let api = get_api(EmptyListPolicy::EmptyArray).await;

        let result = api.delete(42, &issue_session_token("u1")).await;

        match result {
            Err(ClientError::NotFound(message)) => assert_eq!(message, RECORD_NOT_FOUND),
            other => panic!("want not found, got {other:?}"),
        }
    }
}
