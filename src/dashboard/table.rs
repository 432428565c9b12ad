//! The editable table of a user's records.
//!
//! Text cells are inputs that send the single edited field to the server
//! when they lose focus.

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        ALERT_CONTAINER_ID, BUTTON_DELETE_STYLE, CELL_INPUT_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
    },
    record::{FinancialRecord, RecordField},
    timezone::format_local_date_time,
};

pub(super) const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this record?";

/// Renders the records table with dates shown in `local_offset`.
pub(super) fn records_table_view(records: &[FinancialRecord], local_offset: UtcOffset) -> Markup {
    let alert_target = format!("#{ALERT_CONTAINER_ID}");

    html! {
        section id="records" class="w-full mx-auto mb-6"
        {
            h2 class="text-2xl font-bold text-center mb-4" { "Your Financial Records" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            @for field in RecordField::ALL {
                                th scope="col" class=(TABLE_CELL_STYLE) { (field.label()) }
                            }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Delete" }
                        }
                    }

                    tbody
                    {
                        @for record in records {
                            @let record_url = format_endpoint(endpoints::DASHBOARD_RECORD, record.id);

                            tr class=(TABLE_ROW_STYLE) data-record-id=(record.id)
                            {
                                @for field in RecordField::ALL {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (editable_cell(record, field, &record_url, &alert_target))
                                    }
                                }

                                td class={(TABLE_CELL_STYLE) " whitespace-nowrap"}
                                {
                                    (format_local_date_time(record.date, local_offset))
                                }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    button
                                        type="button"
                                        class=(BUTTON_DELETE_STYLE)
                                        hx-delete=(record_url)
                                        hx-confirm=(DELETE_CONFIRMATION)
                                        hx-target-error=(alert_target)
                                    {
                                        "Delete"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn editable_cell(
    record: &FinancialRecord,
    field: RecordField,
    record_url: &str,
    alert_target: &str,
) -> Markup {
    let input_type = match field {
        RecordField::Amount => "number",
        _ => "text",
    };
    let field_vals = format!(r#"{{"field": "{field}"}}"#);

    html! {
        input
            type=(input_type)
            step=[(field == RecordField::Amount).then_some("any")]
            name="value"
            aria-label=(field.label())
            value=(record.field_value(field))
            class=(CELL_INPUT_STYLE)
            hx-put=(record_url)
            hx-trigger="blur changed"
            hx-vals=(field_vals)
            hx-target-error=(alert_target)
            required;
    }
}
