//! Financial records: the model, the queries that store them and the JSON API.
//!
//! This module contains:
//! - The `FinancialRecord` model and the `NewRecord` builder
//! - Database functions for storing, querying and deleting records
//! - Route handlers for the record API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod payload;
mod update_endpoint;

pub use core::{
    FinancialRecord, INCOME_CATEGORIES, NewRecord, RecordField, RecordId, create_record,
    create_record_table, delete_record, get_record, get_records_by_user,
    parse_amount, replace_record,
};
pub use create_endpoint::{RecordStoreState, create_record_endpoint};
pub use delete_endpoint::delete_record_endpoint;
pub use list_endpoint::{EmptyListPolicy, ListRecordsState, list_records_endpoint};
pub use payload::RecordPayload;
pub use update_endpoint::update_record_endpoint;

#[cfg(test)]
pub use core::count_records;
