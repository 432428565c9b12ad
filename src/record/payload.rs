//! The JSON body accepted when creating or replacing a record.

use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserId,
    record::{NewRecord, parse_amount},
};

/// A record as sent by a client.
///
/// The owner is optional because the server always takes it from the session.
/// Unknown fields such as `_id` are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    date: OffsetDateTime,
    description: String,
    amount: AmountValue,
    category: String,
    payment_method: String,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AmountValue {
    Number(f64),
    Text(String),
}

impl RecordPayload {
    /// Assign the payload to `owner`.
    ///
    /// # Errors
    /// Returns [Error::ForeignUser] if the payload names a different owner, or
    /// [Error::InvalidAmount] if a text amount is not a number.
    pub fn into_new_record(self, owner: &UserId) -> Result<NewRecord, Error> {
        if self
            .user_id
            .as_deref()
            .is_some_and(|user_id| user_id != owner.as_str())
        {
            return Err(Error::ForeignUser);
        }

        let amount = match self.amount {
            AmountValue::Number(amount) => amount,
            AmountValue::Text(text) => parse_amount(&text)?,
        };

        Ok(NewRecord {
            user_id: owner.clone(),
            date: self.date,
            description: self.description,
            amount,
            category: self.category,
            payment_method: self.payment_method,
            currency: self.currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{Error, auth::UserId, record::RecordPayload};

    fn parse(json: &str) -> RecordPayload {
        serde_json::from_str(json).expect("Could not parse payload")
    }

    #[test]
    fn ignores_client_id_and_takes_owner_from_session() {
        let payload = parse(
            r#"{
                "_id": 99,
                "date": "2025-03-01T09:30:00+13:00",
                "description": "pay",
                "amount": 1000,
                "category": "Salary",
                "paymentMethod": "bank"
            }"#,
        );

        let record = payload.into_new_record(&UserId::new("u1")).unwrap();

        assert_eq!(record.user_id, UserId::new("u1"));
        assert_eq!(record.date, datetime!(2025-02-28 20:30 UTC));
        assert_eq!(record.amount, 1000.0);
    }

    #[test]
    fn accepts_matching_user_id() {
        let payload = parse(
            r#"{
                "userId": "u1",
                "date": "2025-03-01T09:30:00Z",
                "description": "pay",
                "amount": "12.50",
                "category": "Salary",
                "paymentMethod": "bank",
                "currency": "NZD"
            }"#,
        );

        let record = payload.into_new_record(&UserId::new("u1")).unwrap();

        assert_eq!(record.amount, 12.5);
        assert_eq!(record.currency.as_deref(), Some("NZD"));
    }

    #[test]
    fn rejects_other_user_id() {
        let payload = parse(
            r#"{
                "userId": "u2",
                "date": "2025-03-01T09:30:00Z",
                "description": "pay",
                "amount": 1,
                "category": "Salary",
                "paymentMethod": "bank"
            }"#,
        );

        let result = payload.into_new_record(&UserId::new("u1"));

        assert_eq!(result, Err(Error::ForeignUser));
    }

    #[test]
    fn rejects_non_numeric_amount_text() {
        let payload = parse(
            r#"{
                "date": "2025-03-01T09:30:00Z",
                "description": "pay",
                "amount": "lots",
                "category": "Salary",
                "paymentMethod": "bank"
            }"#,
        );

        let result = payload.into_new_record(&UserId::new("u1"));

        assert_eq!(result, Err(Error::InvalidAmount("lots".to_owned())));
    }
}
