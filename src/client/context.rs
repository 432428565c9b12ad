//! A client-side mirror of the signed-in user's records.
//!
//! The server is the single source of truth: the context only changes its
//! snapshot after the API confirms a change, and [RecordContext::revalidate]
//! replaces the snapshot wholesale.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use time::OffsetDateTime;
use tokio::sync::broadcast;

use crate::{
    auth::UserId,
    client::{ClientConfig, ClientError, ClientResult, IdentityProvider, RecordApi},
    dashboard::{Totals, summarize},
    record::{FinancialRecord, NewRecord, RecordField, RecordId},
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A message for the user about the outcome of a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The change was stored.
    Success(String),
    /// The change failed and the records were left as they were.
    Error(String),
}

/// Something that happened to the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEvent {
    /// A change succeeded or failed.
    Notification(Notification),
    /// The records were replaced with a fresh copy from the server.
    Revalidated {
        /// How many records the user has.
        count: usize,
    },
    /// The user signed out and the records were dropped.
    Cleared,
}

/// The fields of a new record before the owner is known.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    /// When the income was earned or the money was spent.
    pub date: OffsetDateTime,
    /// What the record was for.
    pub description: String,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// A free-text category, e.g. "Food" or "Salary".
    pub category: String,
    /// How the money was paid or received.
    pub payment_method: String,
    /// An optional currency tag.
    pub currency: Option<String>,
}

impl RecordDraft {
    fn into_new_record(self, user_id: UserId) -> NewRecord {
        NewRecord {
            user_id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            category: self.category,
            payment_method: self.payment_method,
            currency: self.currency,
        }
    }
}

/// Keeps the signed-in user's records in sync with the record API.
pub struct RecordContext<I: IdentityProvider> {
    identity: Arc<I>,
    api: RecordApi,
    records: Mutex<Vec<FinancialRecord>>,
    events: broadcast::Sender<ContextEvent>,
}

impl<I: IdentityProvider> RecordContext<I> {
    /// Create an empty context. Call [RecordContext::sync_session] to load the
    /// records of the signed-in user.
    pub fn new(config: &ClientConfig, identity: Arc<I>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            identity,
            api: RecordApi::new(config),
            records: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Receive the events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ContextEvent> {
        self.events.subscribe()
    }

    /// A snapshot of the records in the order the server returned them.
    pub fn records(&self) -> Vec<FinancialRecord> {
        self.lock_records().clone()
    }

    /// Income, expense and net totals of the current snapshot.
    pub fn summary(&self) -> Totals {
        summarize(&self.lock_records())
    }

    /// Follow the identity provider's session: load the user's records after
    /// sign-in, or drop them after sign-out.
    ///
    /// A failed fetch is not retried and leaves the records empty.
    pub async fn sync_session(&self) -> ClientResult<()> {
        self.lock_records().clear();

        if !self.identity.is_signed_in() {
            tracing::warn!("User not authenticated!");
            self.emit(ContextEvent::Cleared);
            return Ok(());
        }

        self.revalidate().await.map(|_| ())
    }

    /// Replace the snapshot with the records currently stored on the server.
    ///
    /// Returns the number of records.
    pub async fn revalidate(&self) -> ClientResult<usize> {
        let result = match self.session() {
            Ok((user_id, token)) => self.api.list_by_user(&user_id, &token).await,
            Err(error) => Err(error),
        };

        match result {
            Ok(records) => {
                let count = records.len();
                *self.lock_records() = records;
                self.emit(ContextEvent::Revalidated { count });
                Ok(count)
            }
            Err(error) => {
                tracing::error!("Failed to fetch records: {error}");
                self.notify(Notification::Error(format!(
                    "Failed to fetch records: {error}"
                )));
                Err(error)
            }
        }
    }

    /// Store a new record for the signed-in user and append it.
    pub async fn add_record(&self, draft: RecordDraft) -> ClientResult<FinancialRecord> {
        let (user_id, token) = match self.session() {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!("User not authenticated!");
                self.notify(Notification::Error(
                    "You must be signed in to add a record.".to_owned(),
                ));
                return Err(error);
            }
        };

        let result = self
            .api
            .create(&draft.into_new_record(user_id), &token)
            .await
            .inspect(|created| self.lock_records().push(created.clone()));

        self.settle(result, "Record added successfully!", "Failed to add record")
    }

    /// Replace every field of the record `id` and splice the stored version in.
    pub async fn update_record(
        &self,
        id: RecordId,
        record: NewRecord,
    ) -> ClientResult<FinancialRecord> {
        let result = match self.session() {
            Ok((_, token)) => self.api.replace(id, &record, &token).await,
            Err(error) => Err(error),
        }
        .inspect(|updated| {
            let mut records = self.lock_records();
            if let Some(record) = records.iter_mut().find(|record| record.id == id) {
                *record = updated.clone();
            }
        });

        self.settle(
            result,
            "Record updated successfully!",
            "Failed to update record",
        )
    }

    /// Merge a single edited cell into the record `id` and store it.
    pub async fn update_field(
        &self,
        id: RecordId,
        field: RecordField,
        value: &str,
    ) -> ClientResult<FinancialRecord> {
        let current = self
            .lock_records()
            .iter()
            .find(|record| record.id == id)
            .cloned();

        let merged = match current {
            Some(record) => record
                .with_field(field, value)
                .map_err(|error| ClientError::InvalidField(error.to_string())),
            None => Err(ClientError::NotFound(format!("record {id}"))),
        };

        match merged {
            Ok(record) => self.update_record(id, record.to_new_record()).await,
            Err(error) => self.settle(Err(error), "", "Failed to update record"),
        }
    }

    /// Delete the record `id` and remove it from the snapshot.
    pub async fn delete_record(&self, id: RecordId) -> ClientResult<FinancialRecord> {
        let result = match self.session() {
            Ok((_, token)) => self.api.delete(id, &token).await,
            Err(error) => Err(error),
        }
        .inspect(|deleted| {
            self.lock_records().retain(|record| record.id != deleted.id);
        });

        self.settle(
            result,
            "Record deleted successfully!",
            "Failed to delete record",
        )
    }

    fn session(&self) -> ClientResult<(UserId, String)> {
        match (
            self.identity.current_user_id(),
            self.identity.session_token(),
        ) {
            (Some(user_id), Some(token)) => Ok((user_id, token)),
            _ => Err(ClientError::NotSignedIn),
        }
    }

    /// Log and notify the outcome of a change.
    fn settle<T>(
        &self,
        result: ClientResult<T>,
        success_message: &str,
        failure_message: &str,
    ) -> ClientResult<T> {
        match &result {
            Ok(_) => self.notify(Notification::Success(success_message.to_owned())),
            Err(error) => {
                tracing::error!("{failure_message}: {error}");
                self.notify(Notification::Error(format!("{failure_message}: {error}")));
            }
        }

        result
    }

    fn notify(&self, notification: Notification) {
        self.emit(ContextEvent::Notification(notification));
    }

    fn emit(&self, event: ContextEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock_records(&self) -> MutexGuard<'_, Vec<FinancialRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
