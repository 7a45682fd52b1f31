//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert,
    internal_server_error::InternalServerError,
    not_found::NotFoundError,
    rows::{RowError, RowId},
    store::FormId,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// No response was received from the backend API.
    #[error("could not reach the backend: {0}")]
    BackendUnavailable(String),

    /// The backend API answered with a non-2xx status.
    #[error("the backend rejected the request with status {status}: {body}")]
    BackendRejected {
        /// The HTTP status code.
        status: u16,
        /// The response body, usually a message from the backend.
        body: String,
    },

    /// The backend API answered with a body that could not be parsed.
    #[error("could not parse the backend's response: {0}")]
    InvalidBackendResponse(String),

    /// The form session does not exist, e.g. because it was evicted.
    #[error("there is no open form with the ID {0}")]
    UnknownForm(FormId),

    /// The form is already being submitted.
    #[error("the form is already being submitted")]
    SubmissionInProgress,

    /// A row edit was rejected.
    #[error("invalid row edit: {0}")]
    InvalidRowEdit(#[from] RowError),

    /// The amount of a selected row cannot be changed.
    #[error("row {0} is selected, its amount cannot be changed")]
    AmountLocked(RowId),

    /// A reimbursement request was submitted without any complete expense.
    #[error("no complete expense rows")]
    NoCompleteRows,

    /// A list of fines was submitted without any complete fine.
    #[error("no complete fine rows")]
    NoCompleteFines,

    /// A beverage report was submitted without a report date.
    #[error("the report date is missing")]
    MissingReportDate,

    /// The e-mail address does not belong to a configured member.
    #[error("unknown member \"{0}\"")]
    UnknownMember(String),

    /// The submitted form data is invalid.
    #[error("invalid form data: {0}")]
    InvalidForm(String),

    /// Could not acquire the lock on the open forms.
    #[error("could not acquire the form store lock")]
    FormStoreLockError,

    /// Could not acquire the lock on the member roster.
    #[error("could not acquire the member roster lock")]
    MemberLockError,

    /// The backend answered the missing payments without reporting success.
    #[error("the backend did not store the payments")]
    PaymentsNotSaved,

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The configuration file could not be read.
    #[error("could not load the configuration: {0}")]
    ConfigError(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::UnknownForm(_) => NotFoundError.into_response(),
            Error::BackendUnavailable(_) => InternalServerError {
                description: "The backend is not reachable.",
                fix: "Check that the backend is running and try again.",
            }
            .into_response(),
            Error::FormStoreLockError | Error::MemberLockError => {
                InternalServerError::default().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::UnknownForm(_) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Form expired".to_owned(),
                    details: "This form is no longer open. Reload the page and try again."
                        .to_owned(),
                },
            ),
            Error::SubmissionInProgress => (
                StatusCode::CONFLICT,
                Alert::ErrorSimple {
                    message: "The form is already being submitted.".to_owned(),
                },
            ),
            Error::InvalidRowEdit(error) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: error.to_string(),
                },
            ),
            Error::AmountLocked(_) => (
                StatusCode::CONFLICT,
                Alert::ErrorSimple {
                    message: "Deselect the payment to change its amount.".to_owned(),
                },
            ),
            Error::NoCompleteRows => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Keine vollständigen Ausgaben".to_owned(),
                    details: "Bitte Bezeichnung, Datum, Betrag und Beleg für mindestens eine \
                        Ausgabe angeben."
                        .to_owned(),
                },
            ),
            Error::NoCompleteFines => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Keine vollständigen Strafen".to_owned(),
                    details: "Bitte Mitglied, Betrag und Grund für mindestens eine Strafe \
                        angeben."
                        .to_owned(),
                },
            ),
            Error::MissingReportDate => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Bitte ein Datum für die Abrechnung auswählen.".to_owned(),
                },
            ),
            Error::UnknownMember(email) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unknown member".to_owned(),
                    details: format!("No member with the e-mail address {email} is configured."),
                },
            ),
            Error::InvalidForm(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid form data".to_owned(),
                    details,
                },
            ),
            Error::MultipartError(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the upload".to_owned(),
                    details,
                },
            ),
            Error::BackendRejected { status, body } => (
                StatusCode::BAD_GATEWAY,
                Alert::Error {
                    message: format!("The backend rejected the request ({status})"),
                    details: body,
                },
            ),
            Error::PaymentsNotSaved => (
                StatusCode::BAD_GATEWAY,
                Alert::ErrorSimple {
                    message: "Die Zahlungen wurden nicht gespeichert.".to_owned(),
                },
            ),
            Error::BackendUnavailable(_) => (
                StatusCode::BAD_GATEWAY,
                Alert::ErrorSimple {
                    message: "Ein Fehler ist aufgetreten.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
