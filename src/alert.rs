//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the page's `#alert-container`. Error responses
//! are routed there by the `hx-target-error` attribute on the page body.
//! Row and form endpoints target the container directly and send every other
//! change as an out-of-band swap, so their main content is either an alert
//! or nothing, which clears a stale alert.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// A message shown to the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action succeeded, with extra details.
    Success {
        /// The headline.
        message: String,
        /// Extra context shown under the headline.
        details: String,
    },
    /// The action succeeded.
    SuccessSimple {
        /// The headline.
        message: String,
    },
    /// The action failed, with extra details.
    Error {
        /// The headline.
        message: String,
        /// Extra context shown under the headline.
        details: String,
    },
    /// The action failed.
    ErrorSimple {
        /// The headline.
        message: String,
    },
}

impl Alert {
    fn is_error(&self) -> bool {
        matches!(self, Alert::Error { .. } | Alert::ErrorSimple { .. })
    }

    fn view(&self) -> Markup {
        let (message, details) = match self {
            Alert::Success { message, details } | Alert::Error { message, details } => {
                (message.as_str(), details.as_str())
            }
            Alert::SuccessSimple { message } | Alert::ErrorSimple { message } => {
                (message.as_str(), "")
            }
        };

        let style = if self.is_error() {
            "text-red-800 bg-red-50 border-red-300 dark:bg-gray-800 \
            dark:text-red-400 dark:border-red-800"
        } else {
            "text-green-800 bg-green-50 border-green-300 dark:bg-gray-800 \
            dark:text-green-400 dark:border-green-800"
        };

        html! {
            div
                role="alert"
                data-alert=(if self.is_error() { "error" } else { "success" })
                class={ "flex items-start gap-3 p-4 mb-4 text-sm border rounded-lg shadow " (style) }
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-auto font-bold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    /// Render the alert for embedding in a larger response.
    pub fn into_markup(self) -> Markup {
        self.view()
    }

    /// Render the alert to be swapped into the alert container as the main content.
    pub fn into_html(self) -> Html<String> {
        Html(self.view().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status = if self.is_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::OK
        };

        (status, self.into_html()).into_response()
    }
}
