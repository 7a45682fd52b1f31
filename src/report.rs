//! Asks the backend to e-mail a member their account report.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{AppState, Error, alert::Alert, backend::BackendClient};

/// The state needed to send reports.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub backend: BackendClient,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportForm {
    /// The member who receives the report.
    pub email: String,
}

/// Send the account report to a member and tell the user how it went.
pub async fn send_report(
    State(state): State<ReportState>,
    Form(form): Form<ReportForm>,
) -> Response {
    let email = form.email;

    let message = match state.backend.send_report(&email).await {
        Ok(()) => {
            tracing::info!("sent report to {email}");

            return Alert::SuccessSimple {
                message: format!("Bericht wurde erfolgreich gesendet an {email}"),
            }
            .into_response();
        }
        Err(Error::BackendRejected { status, body }) => {
            tracing::warn!("backend refused to send report to {email} ({status}): {body}");
            format!("Fehler beim Senden des Berichts an {email}")
        }
        Err(Error::BackendUnavailable(error)) => {
            tracing::error!("could not send report to {email}: {error}");
            "Ein Fehler ist aufgetreten.".to_owned()
        }
        Err(error) => return error.into_alert_response(),
    };

    (
        StatusCode::BAD_GATEWAY,
        Alert::ErrorSimple { message }.into_html(),
    )
        .into_response()
}
