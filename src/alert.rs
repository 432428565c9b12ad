//! Alert system for displaying success and error messages to users.
//!
//! Error alerts are sent in response to failed htmx requests and swapped into
//! the page's alert container. Success alerts are rendered into the page after
//! a mutation redirects back to it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A message for the user with optional details.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something the user asked for worked.
    Success {
        /// A short headline.
        message: String,
        /// More context, may be empty.
        details: String,
    },
    /// Something the user asked for failed.
    Error {
        /// A short headline.
        message: String,
        /// What went wrong and how to fix it, may be empty.
        details: String,
    },
}

impl Alert {
    /// Create a new success alert
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a new error alert
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (
                "flex items-start gap-3 p-4 mb-4 rounded-lg text-green-800 bg-green-50 \
                border border-green-300 dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "flex items-start gap-3 p-4 mb-4 rounded-lg text-red-800 bg-red-50 \
                border border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                message,
                details,
            ),
        };

        html! {
            div role="alert" class=(container_style)
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="font-bold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }
}

/// Render `alert` as an HTML fragment with the given status code.
pub fn render_alert(status_code: StatusCode, alert: Alert) -> Response {
    (status_code, alert.into_html()).into_response()
}
