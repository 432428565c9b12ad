//! Defines the financial record model and the database queries that store it.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserId};

// ============================================================================
// MODELS
// ============================================================================

/// The store-assigned identifier of a [FinancialRecord].
pub type RecordId = i64;

/// Categories that count as income. Everything else is an expense.
pub const INCOME_CATEGORIES: [&str; 2] = ["Salary", "Part Time Job"];

/// A single income or expense entry owned by one user.
///
/// To create a new record, use [FinancialRecord::build] and pass the result
/// to [create_record].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    /// The ID assigned by the store when the record was created.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// The user that owns the record.
    pub user_id: UserId,
    /// When the income was earned or the money was spent.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// What the record was for.
    pub description: String,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// A free-text category, e.g. "Food" or "Salary".
    pub category: String,
    /// How the money was paid or received, e.g. "Cash".
    pub payment_method: String,
    /// An optional currency tag, e.g. "NZD".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl FinancialRecord {
    /// Start building a new record.
    ///
    /// Shortcut for [NewRecord] for discoverability.
    pub fn build(
        user_id: UserId,
        amount: f64,
        date: OffsetDateTime,
        description: &str,
    ) -> NewRecord {
        NewRecord {
            user_id,
            date,
            description: description.to_owned(),
            amount,
            category: String::new(),
            payment_method: String::new(),
            currency: None,
        }
    }

    /// The current value of an editable field formatted for a text input.
    pub fn field_value(&self, field: RecordField) -> String {
        match field {
            RecordField::Description => self.description.clone(),
            RecordField::Amount => self.amount.to_string(),
            RecordField::Category => self.category.clone(),
            RecordField::PaymentMethod => self.payment_method.clone(),
        }
    }

    /// Merge a single edited field into the record.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `field` is the amount and `value` is
    /// not a finite number, or [Error::EmptyField] if `value` is blank.
    pub fn with_field(mut self, field: RecordField, value: &str) -> Result<Self, Error> {
        match field {
            RecordField::Amount => self.amount = parse_amount(value)?,
            RecordField::Description => self.description = value.trim().to_owned(),
            RecordField::Category => self.category = value.trim().to_owned(),
            RecordField::PaymentMethod => self.payment_method = value.trim().to_owned(),
        }

        let (name, text) = match field {
            RecordField::Amount => return Ok(self),
            RecordField::Description => ("description", &self.description),
            RecordField::Category => ("category", &self.category),
            RecordField::PaymentMethod => ("payment method", &self.payment_method),
        };

        if text.is_empty() {
            return Err(Error::EmptyField(name));
        }

        Ok(self)
    }

    /// Copy everything but the ID into a [NewRecord], e.g. to replace the
    /// stored record.
    pub fn to_new_record(&self) -> NewRecord {
        NewRecord {
            user_id: self.user_id.clone(),
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
            category: self.category.clone(),
            payment_method: self.payment_method.clone(),
            currency: self.currency.clone(),
        }
    }
}

/// The fields of a record before the store has assigned it an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// The user that owns the record.
    pub user_id: UserId,
    /// When the income was earned or the money was spent.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// What the record was for.
    pub description: String,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// A free-text category, e.g. "Food" or "Salary".
    pub category: String,
    /// How the money was paid or received, e.g. "Cash".
    pub payment_method: String,
    /// An optional currency tag, e.g. "NZD".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl NewRecord {
    /// Set the category.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the payment method.
    pub fn payment_method(mut self, payment_method: &str) -> Self {
        self.payment_method = payment_method.to_owned();
        self
    }

    /// Set the currency tag.
    pub fn currency(mut self, currency: Option<&str>) -> Self {
        self.currency = currency.map(ToOwned::to_owned);
        self
    }

    /// Check the invariants every stored record must satisfy.
    ///
    /// # Errors
    /// Returns [Error::EmptyField] for blank text fields and
    /// [Error::InvalidAmount] for a non-finite amount.
    pub fn validate(&self) -> Result<(), Error> {
        if self.user_id.as_str().trim().is_empty() {
            return Err(Error::EmptyField("user ID"));
        }

        let text_fields = [
            ("description", &self.description),
            ("category", &self.category),
            ("payment method", &self.payment_method),
        ];

        if let Some((name, _)) = text_fields
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
        {
            return Err(Error::EmptyField(name));
        }

        if !self.amount.is_finite() {
            return Err(Error::InvalidAmount(self.amount.to_string()));
        }

        Ok(())
    }
}

/// The fields of a record that can be edited one cell at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    /// [FinancialRecord::description]
    Description,
    /// [FinancialRecord::amount]
    Amount,
    /// [FinancialRecord::category]
    Category,
    /// [FinancialRecord::payment_method]
    PaymentMethod,
}

impl RecordField {
    /// The editable fields in the order they are displayed.
    pub const ALL: [RecordField; 4] = [
        RecordField::Description,
        RecordField::Amount,
        RecordField::Category,
        RecordField::PaymentMethod,
    ];

    /// The name used for the field in JSON and forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Description => "description",
            RecordField::Amount => "amount",
            RecordField::Category => "category",
            RecordField::PaymentMethod => "paymentMethod",
        }
    }

    /// The human readable column name.
    pub fn label(&self) -> &'static str {
        match self {
            RecordField::Description => "Description",
            RecordField::Amount => "Amount",
            RecordField::Category => "Category",
            RecordField::PaymentMethod => "Payment Method",
        }
    }
}

impl Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a user-entered amount.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `text` is not a finite number.
pub fn parse_amount(text: &str) -> Result<f64, Error> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::InvalidAmount(text.to_owned()))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const RECORD_COLUMNS: &str =
    "id, user_id, date, description, amount, category, payment_method, currency";

/// Create a new record in the database.
///
/// Any ID the caller may have had is ignored, the store assigns a new one.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] or [Error::InvalidAmount] if the record is invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_record(
    new_record: NewRecord,
    connection: &Connection,
) -> Result<FinancialRecord, Error> {
    new_record.validate()?;

    let record = connection
        .prepare(&format!(
            "INSERT INTO financial_record (user_id, date, description, amount, category, payment_method, currency)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {RECORD_COLUMNS}"
        ))?
        .query_row(
            (
                new_record.user_id.as_str(),
                new_record.date,
                new_record.description,
                new_record.amount,
                new_record.category,
                new_record.payment_method,
                new_record.currency,
            ),
            map_record_row,
        )?;

    Ok(record)
}

/// Retrieve the records owned by `user_id` in the order they were created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_records_by_user(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<FinancialRecord>, Error> {
    connection
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM financial_record WHERE user_id = :user_id ORDER BY id ASC"
        ))?
        .query_map(&[(":user_id", user_id.as_str())], map_record_row)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// Retrieve the record with `id` if it is owned by `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a record owned by `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_record(
    id: RecordId,
    owner: &UserId,
    connection: &Connection,
) -> Result<FinancialRecord, Error> {
    let record = connection
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM financial_record WHERE id = :id AND user_id = :user_id"
        ))?
        .query_one(
            rusqlite::named_params! {":id": id, ":user_id": owner.as_str()},
            map_record_row,
        )?;

    Ok(record)
}

/// Replace every field of the record with `id` owned by `new_record.user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] or [Error::InvalidAmount] if the record is invalid,
/// - [Error::UpdateMissingRecord] if no record with `id` belongs to the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn replace_record(
    id: RecordId,
    new_record: NewRecord,
    connection: &Connection,
) -> Result<FinancialRecord, Error> {
    new_record.validate()?;

    connection
        .prepare(&format!(
            "UPDATE financial_record
             SET date = ?1, description = ?2, amount = ?3, category = ?4, payment_method = ?5, currency = ?6
             WHERE id = ?7 AND user_id = ?8
             RETURNING {RECORD_COLUMNS}"
        ))?
        .query_row(
            (
                new_record.date,
                new_record.description,
                new_record.amount,
                new_record.category,
                new_record.payment_method,
                new_record.currency,
                id,
                new_record.user_id.as_str(),
            ),
            map_record_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingRecord,
            error => error.into(),
        })
}

/// Delete the record with `id` owned by `owner` and return what was deleted.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingRecord] if no record with `id` belongs to `owner`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_record(
    id: RecordId,
    owner: &UserId,
    connection: &Connection,
) -> Result<FinancialRecord, Error> {
    connection
        .prepare(&format!(
            "DELETE FROM financial_record WHERE id = ?1 AND user_id = ?2 RETURNING {RECORD_COLUMNS}"
        ))?
        .query_row((id, owner.as_str()), map_record_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingRecord,
            error => error.into(),
        })
}

/// Get the total number of records in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_records(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM financial_record;", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the financial record table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_record (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                payment_method TEXT NOT NULL,
                currency TEXT
                )",
        (),
    )?;

    // Every read is filtered by the owning user.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_financial_record_user_id ON financial_record(user_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [FinancialRecord].
fn map_record_row(row: &Row) -> Result<FinancialRecord, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id: String = row.get(1)?;
    let date = row.get(2)?;
    let description = row.get(3)?;
    let amount = row.get(4)?;
    let category = row.get(5)?;
    let payment_method = row.get(6)?;
    let currency = row.get(7)?;

    Ok(FinancialRecord {
        id,
        user_id: UserId::new(user_id),
        date,
        description,
        amount,
        category,
        payment_method,
        currency,
    })
}

// ============================================================================
// TESTS
// ============================================================================
