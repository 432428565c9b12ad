//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - The htmx handlers for adding, editing and deleting records
//! - State and form types used by the handlers

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserId,
    dashboard::{
        aggregation::summarize,
        cards::summary_cards_view,
        charts::{DashboardChart, charts_script, charts_view, overview_chart},
        form::{RecordForm, record_form_view},
        table::records_table_view,
    },
    db::lock_connection,
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base},
    record::{
        FinancialRecord, RecordField, RecordId, create_record, delete_record, get_record,
        get_records_by_user, replace_record,
    },
    timezone::get_local_offset,
};

const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The state needed for displaying the dashboard page and editing records from it.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A change that the dashboard confirms after redirecting back to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notice {
    /// A record was created from the form.
    RecordAdded,
    /// A cell of a record was edited.
    RecordUpdated,
    /// A record was deleted.
    RecordDeleted,
    /// A notice this version does not know, ignored.
    #[serde(other)]
    Unknown,
}

impl Notice {
    fn as_str(&self) -> &'static str {
        match self {
            Notice::RecordAdded => "record-added",
            Notice::RecordUpdated => "record-updated",
            Notice::RecordDeleted => "record-deleted",
            Notice::Unknown => "",
        }
    }

    fn redirect_url(&self) -> String {
        format!("{}?notice={}", endpoints::DASHBOARD_VIEW, self.as_str())
    }

    fn into_alert(self) -> Option<Alert> {
        let message = match self {
            Notice::RecordAdded => "Record added successfully!",
            Notice::RecordUpdated => "Record updated successfully!",
            Notice::RecordDeleted => "Record deleted successfully!",
            Notice::Unknown => return None,
        };

        Some(Alert::success(message, ""))
    }
}

/// The query parameters of the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Set by the redirect after a successful change.
    pub notice: Option<Notice>,
}

/// The form data for editing a single cell of the records table.
#[derive(Debug, Deserialize)]
pub struct CellEditForm {
    /// The column that was edited.
    pub field: RecordField,
    /// The new text of the cell.
    pub value: String,
}

/// Display the signed-in user's records, a chart and summary totals.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;

    let records = {
        let connection = lock_connection(&state.db_connection)?;
        get_records_by_user(&user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get records: {error}"))?
    };

    let notice = query.notice.and_then(Notice::into_alert);

    Ok(dashboard_view(&records, local_offset, notice).into_response())
}

/// A route handler for adding a record from the dashboard form, redirects to
/// the dashboard on success.
pub async fn create_record_from_form(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<RecordForm>,
) -> Response {
    let local_offset = match local_offset(&state.local_timezone) {
        Ok(local_offset) => local_offset,
        Err(error) => return error.into_alert_response(),
    };

    let new_record = match form.into_new_record(user_id, local_offset) {
        Ok(new_record) => new_record,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = create_record(new_record, &connection) {
        tracing::error!("could not create record: {error}");
        return error.into_alert_response();
    }

    redirect_to_dashboard(Notice::RecordAdded)
}

/// A route handler for committing an edited table cell, redirects to the
/// dashboard on success.
pub async fn edit_record_field(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
    record_id: Result<Path<RecordId>, PathRejection>,
    Form(form): Form<CellEditForm>,
) -> Response {
    let Ok(Path(record_id)) = record_id else {
        return Error::UpdateMissingRecord.into_alert_response();
    };

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_alert_response(),
    };

    let result = get_record(record_id, &user_id, &connection)
        .map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingRecord,
            error => error,
        })
        .and_then(|record| record.with_field(form.field, &form.value))
        .and_then(|record| replace_record(record_id, record.to_new_record(), &connection));

    match result {
        Ok(_) => redirect_to_dashboard(Notice::RecordUpdated),
        Err(error) => {
            tracing::error!("could not update the {} of record {record_id}: {error}", form.field);
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a record from the dashboard, redirects to
/// the dashboard on success.
pub async fn delete_record_from_dashboard(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
    record_id: Result<Path<RecordId>, PathRejection>,
) -> Response {
    let Ok(Path(record_id)) = record_id else {
        return Error::DeleteMissingRecord.into_alert_response();
    };

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_alert_response(),
    };

    match delete_record(record_id, &user_id, &connection) {
        Ok(_) => redirect_to_dashboard(Notice::RecordDeleted),
        Err(error) => {
            tracing::error!("could not delete record {record_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn local_offset(local_timezone: &str) -> Result<UtcOffset, Error> {
    get_local_offset(local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", local_timezone);
        Error::InvalidTimezoneError(local_timezone.to_owned())
    })
}

fn redirect_to_dashboard(notice: Notice) -> Response {
    (HxRedirect(notice.redirect_url()), StatusCode::SEE_OTHER).into_response()
}

fn dashboard_view(
    records: &[FinancialRecord],
    local_offset: UtcOffset,
    notice: Option<Alert>,
) -> Markup {
    let totals = summarize(records);
    let charts = [DashboardChart {
        id: "financial-overview-chart",
        options: overview_chart(&totals).to_string(),
    }];

    let content = html!(
        div id="dashboard-content" class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl"}
        {
            section
                id="hero"
                class="w-full max-w-4xl mb-6 p-6 rounded-xl shadow-2xl text-center
                    bg-white dark:bg-gray-800"
            {
                h1 class="text-3xl md:text-5xl font-extrabold text-teal-600"
                {
                    "Welcome to Shawlet"
                }

                h2 class="text-lg md:text-2xl font-semibold mt-2"
                {
                    "Take Control of Your Finances"
                }
            }

            @if let Some(notice) = notice {
                div id="notice" class="w-full max-w-md" { (notice.into_html()) }
            }

            (record_form_view(local_offset))

            @if records.is_empty() {
                div id="empty-state" class="text-center"
                {
                    h2 class="text-xl font-bold" { "Nothing here yet..." }
                    p
                    {
                        "Your chart and totals will show up here once you add a record."
                    }
                }
            } @else {
                (charts_view(&charts))
                (summary_cards_view(&totals))
                (records_table_view(records, local_offset))
            }
        }
    );

    if records.is_empty() {
        return base("Dashboard", &[], &content);
    }

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        auth::UserId,
        dashboard::{
            form::RecordForm,
            handlers::{
                CellEditForm, DashboardQuery, DashboardState, Notice, create_record_from_form,
                delete_record_from_dashboard, edit_record_field, get_dashboard_page,
            },
        },
        db::initialize,
        record::{FinancialRecord, RecordField, count_records, create_record, get_record},
        test_utils::{assert_hx_redirect, assert_valid_html, parse_html_document},
    };

    fn get_test_state() -> DashboardState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn insert_record(
        state: &DashboardState,
        user_id: &str,
        amount: f64,
        category: &str,
    ) -> FinancialRecord {
        let connection = state.db_connection.lock().unwrap();
        create_record(
            FinancialRecord::build(
                UserId::new(user_id),
                amount,
                datetime!(2025-03-01 09:30 UTC),
                "test",
            )
            .category(category)
            .payment_method("Cash"),
            &connection,
        )
        .unwrap()
    }

    async fn render_page(state: DashboardState, user_id: &str, notice: Option<Notice>) -> Html {
        let response = get_dashboard_page(
            State(state),
            Extension(UserId::new(user_id)),
            Query(DashboardQuery { notice }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    fn text_of(html: &Html, selector: &str) -> Option<String> {
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .map(|element| element.text().collect::<String>().trim().to_owned())
    }

    #[tokio::test]
    async fn shows_empty_state_without_records() {
        let html = render_page(get_test_state(), "u1", None).await;

        assert_eq!(text_of(&html, "#hero h1").as_deref(), Some("Welcome to Shawlet"));
        assert!(text_of(&html, "#empty-state").is_some());
        assert!(text_of(&html, "table").is_none());
        assert!(text_of(&html, "#add-record summary").is_some());
    }

    #[tokio::test]
    async fn shows_chart_cards_and_table_for_own_records() {
        let state = get_test_state();
        insert_record(&state, "u1", 500.0, "Salary");
        insert_record(&state, "u1", 200.0, "Food");
        insert_record(&state, "u2", 999.0, "Salary");

        let html = render_page(state, "u1", None).await;

        assert!(
            html.select(&Selector::parse("#financial-overview-chart").unwrap())
                .next()
                .is_some()
        );
        let rows = html.select(&Selector::parse("tbody tr").unwrap()).count();
        assert_eq!(rows, 2);
        assert!(text_of(&html, "#empty-state").is_none());
        assert_eq!(
            text_of(&html, "#net-balance"),
            Some(crate::html::format_currency(300.0))
        );
    }

    #[tokio::test]
    async fn shows_notice_after_redirect() {
        let html = render_page(get_test_state(), "u1", Some(Notice::RecordAdded)).await;

        let notice = text_of(&html, "#notice").expect("No notice found");
        assert!(notice.contains("Record added successfully!"));
    }

    #[test]
    fn unknown_notice_is_ignored() {
        let query: DashboardQuery = serde_html_form::from_str("notice=bogus").unwrap();

        assert_eq!(query.notice, Some(Notice::Unknown));
        assert_eq!(Notice::Unknown.into_alert(), None);
    }

    #[tokio::test]
    async fn creates_record_from_form() {
        let state = get_test_state();
        let form = RecordForm {
            description: "Lunch".to_owned(),
            amount: "12.5".to_owned(),
            category: "Food".to_owned(),
            payment_method: "Cash".to_owned(),
            date: datetime!(2025-03-01 09:30),
        };

        let response =
            create_record_from_form(State(state.clone()), Extension(UserId::new("u1")), Form(form))
                .await;

        assert_hx_redirect(&response, "/dashboard?notice=record-added");
        let connection = state.db_connection.lock().unwrap();
        let record = get_record(1, &UserId::new("u1"), &connection).unwrap();
        assert_eq!(record.amount, 12.5);
        assert_eq!(record.date, datetime!(2025-03-01 09:30 UTC));
    }

    #[tokio::test]
    async fn invalid_form_returns_alert() {
        let state = get_test_state();
        let form = RecordForm {
            description: "   ".to_owned(),
            amount: "12.5".to_owned(),
            category: "Food".to_owned(),
            payment_method: "Cash".to_owned(),
            date: datetime!(2025-03-01 09:30),
        };

        let response =
            create_record_from_form(State(state.clone()), Extension(UserId::new("u1")), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(count_records(&state.db_connection.lock().unwrap()).unwrap(), 0);
    }

    #[tokio::test]
    async fn edits_single_field() {
        let state = get_test_state();
        let record = insert_record(&state, "u1", 20.0, "Food");

        let response = edit_record_field(
            State(state.clone()),
            Extension(UserId::new("u1")),
            Ok(Path(record.id)),
            Form(CellEditForm {
                field: RecordField::Amount,
                value: "35.25".to_owned(),
            }),
        )
        .await;

        assert_hx_redirect(&response, "/dashboard?notice=record-updated");
        let connection = state.db_connection.lock().unwrap();
        let updated = get_record(record.id, &UserId::new("u1"), &connection).unwrap();
        assert_eq!(updated.amount, 35.25);
        assert_eq!(updated.description, record.description);
    }

    #[tokio::test]
    async fn cannot_edit_another_users_record() {
        let state = get_test_state();
        let record = insert_record(&state, "u2", 20.0, "Food");

        let response = edit_record_field(
            State(state.clone()),
            Extension(UserId::new("u1")),
            Ok(Path(record.id)),
            Form(CellEditForm {
                field: RecordField::Description,
                value: "hijacked".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        let unchanged = get_record(record.id, &UserId::new("u2"), &connection).unwrap();
        assert_eq!(unchanged, record);
    }

    #[tokio::test]
    async fn blank_cell_returns_alert() {
        let state = get_test_state();
        let record = insert_record(&state, "u1", 20.0, "Food");

        let response = edit_record_field(
            State(state.clone()),
            Extension(UserId::new("u1")),
            Ok(Path(record.id)),
            Form(CellEditForm {
                field: RecordField::Category,
                value: " ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deletes_record() {
        let state = get_test_state();
        let record = insert_record(&state, "u1", 20.0, "Food");

        let response = delete_record_from_dashboard(
            State(state.clone()),
            Extension(UserId::new("u1")),
            Ok(Path(record.id)),
        )
        .await;

        assert_hx_redirect(&response, "/dashboard?notice=record-deleted");
        assert_eq!(count_records(&state.db_connection.lock().unwrap()).unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_missing_record_returns_alert() {
        let response = delete_record_from_dashboard(
            State(get_test_state()),
            Extension(UserId::new("u1")),
            Ok(Path(404)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
