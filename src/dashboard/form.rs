//! The add-record form shown under the dashboard's hero section.

use maud::{Markup, html};
use serde::Deserialize;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{
    Error,
    auth::UserId,
    endpoints,
    html::{ALERT_CONTAINER_ID, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    record::{NewRecord, parse_amount},
};

// The value format of an `<input type="datetime-local">`.
time::serde::format_description!(
    datetime_local,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]"
);

/// The categories offered by the form.
pub(super) const CATEGORIES: [&str; 7] = [
    "Food",
    "Rent",
    "Salary",
    "Part Time Job",
    "Utilities",
    "Entertainment",
    "Other",
];

/// The payment methods offered by the form.
pub(super) const PAYMENT_METHODS: [&str; 3] = ["Credit Card", "Cash", "Bank Transfer"];

/// The form data for adding a record from the dashboard.
#[derive(Debug, Deserialize)]
pub struct RecordForm {
    /// What the record was for.
    pub description: String,
    /// The amount as typed by the user.
    pub amount: String,
    /// One of [CATEGORIES].
    pub category: String,
    /// One of [PAYMENT_METHODS].
    pub payment_method: String,
    /// The local date and time the record occurred.
    #[serde(with = "datetime_local")]
    pub date: PrimitiveDateTime,
}

impl RecordForm {
    /// Convert the form into a record owned by `user_id`, reading `date` as
    /// local time in `local_offset`.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is not a number.
    pub fn into_new_record(
        self,
        user_id: UserId,
        local_offset: UtcOffset,
    ) -> Result<NewRecord, Error> {
        let amount = parse_amount(&self.amount)?;
        let date = self.date.assume_offset(local_offset);

        Ok(NewRecord {
            user_id,
            date,
            description: self.description.trim().to_owned(),
            amount,
            category: self.category,
            payment_method: self.payment_method,
            currency: None,
        })
    }
}

/// Renders the add-record form inside an "Add Record" disclosure.
///
/// The date input defaults to the current time in `local_offset`.
pub(super) fn record_form_view(local_offset: UtcOffset) -> Markup {
    let now = OffsetDateTime::now_utc().to_offset(local_offset);
    let now = PrimitiveDateTime::new(now.date(), now.time());
    let default_date = format_datetime_local(now);

    html! {
        details id="add-record" class="w-full max-w-md mx-auto mb-6"
        {
            summary class=(BUTTON_PRIMARY_STYLE) { "Add Record" }

            form
                hx-post=(endpoints::DASHBOARD_RECORDS)
                hx-target-error={"#" (ALERT_CONTAINER_ID)}
                class="space-y-4 mt-4 p-4 rounded-lg bg-white dark:bg-gray-800 shadow"
            {
                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                    input
                        type="text"
                        id="description"
                        name="description"
                        placeholder="Groceries"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input
                        type="number"
                        id="amount"
                        name="amount"
                        step="0.01"
                        placeholder="0.00"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    (select_input("category", &CATEGORIES))
                }

                div
                {
                    label for="payment_method" class=(FORM_LABEL_STYLE) { "Payment Method" }
                    (select_input("payment_method", &PAYMENT_METHODS))
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                    input
                        type="datetime-local"
                        id="date"
                        name="date"
                        value=(default_date)
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Record" }
            }
        }
    }
}

fn select_input(name: &str, options: &[&str]) -> Markup {
    html! {
        select id=(name) name=(name) class=(FORM_TEXT_INPUT_STYLE) required
        {
            option value="" disabled selected { "Select an option" }
            @for option in options {
                option value=(option) { (option) }
            }
        }
    }
}

fn format_datetime_local(date_time: PrimitiveDateTime) -> String {
    format!(
        "{}T{:02}:{:02}",
        date_time.date(),
        date_time.hour(),
        date_time.minute()
    )
}
