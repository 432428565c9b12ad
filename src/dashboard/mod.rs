//! Dashboard module
//!
//! Provides the signed-in user's overview page: an add-record form, a pie
//! chart of income against expenses, summary totals and an editable records
//! table.

mod aggregation;
mod cards;
mod charts;
mod form;
mod handlers;
mod table;

pub use aggregation::{Flow, Totals, classify, summarize};
pub use handlers::{
    create_record_from_form, delete_record_from_dashboard, edit_record_field, get_dashboard_page,
};
