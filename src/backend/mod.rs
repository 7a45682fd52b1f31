//! Typed access to the backend API that owns the club's data.

mod models;
mod transport;

use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

pub use models::{
    BeverageEntry, BeveragePrice, BeverageReport, MemberStatusUpdate, MissingPayment,
    NewTransaction, RefundType, ReimbursementItem, ReimbursementRequest, SaveAck, Transaction,
};
pub use transport::{BackendRequest, BackendResponse, HttpTransport, Method, Transport};

use crate::{
    Error,
    backend::models::{MissingPaymentsRequest, ReportRequest},
};

/// Characters escaped in a path segment, everything but unreserved characters and '@'.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@');

/// Backend API routes.
mod routes {
    pub const GET_TRANSACTIONS: &str = "/admin/get_transactions";
    pub const DELETE_TRANSACTION: &str = "/delete_transaction";
    pub const ADD_TRANSACTION: &str = "/admin/add_transaction";
    pub const UPDATE_MEMBER_STATUS: &str = "/admin/update_member_status";
    pub const SAVE_MISSING_PAYMENTS: &str = "/admin/save_missing_payments";
    pub const SAVE_BEVERAGE_REPORT: &str = "/admin/save_beverage_report";
    pub const SUBMIT_REIMBURSEMENT: &str = "/submit_reimbursement";
    pub const SEND_REPORT: &str = "/send_report";
}

/// Client for the backend API.
///
/// Cheap to clone, all clones share the same transport.
#[derive(Debug, Clone)]
pub struct BackendClient {
    transport: Arc<dyn Transport>,
}

impl BackendClient {
    /// Create a client that sends its requests through `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Get the transactions of the member with the e-mail address `email`.
    pub async fn get_transactions(&self, email: &str) -> Result<Vec<Transaction>, Error> {
        let query = serde_urlencoded::to_string(&[("email", email)])
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        let response = self
            .send(Method::Get, format!("{}?{query}", routes::GET_TRANSACTIONS), None)
            .await?
            .error_for_status()?;

        response.json()
    }

    /// Delete the transaction `id` of the member `email`.
    ///
    /// # Errors
    /// Returns [Error::BackendRejected] with the backend's message if it
    /// refused the deletion.
    pub async fn delete_transaction(&self, email: &str, id: i64) -> Result<(), Error> {
        let path = format!(
            "{}/{}/{id}",
            routes::DELETE_TRANSACTION,
            utf8_percent_encode(email, PATH_SEGMENT)
        );

        self.send(Method::Post, path, None)
            .await?
            .error_for_status()
            .map(|_| ())
    }

    /// Book a new transaction.
    pub async fn add_transaction(&self, transaction: &NewTransaction) -> Result<(), Error> {
        self.post(routes::ADD_TRANSACTION, transaction).await.map(|_| ())
    }

    /// Change a member's title and residency.
    pub async fn update_member_status(&self, update: &MemberStatusUpdate) -> Result<(), Error> {
        self.post(routes::UPDATE_MEMBER_STATUS, update).await.map(|_| ())
    }

    /// Book the given monthly payments.
    ///
    /// Returns whether the backend reported success.
    pub async fn save_missing_payments(&self, payments: &[MissingPayment]) -> Result<bool, Error> {
        let request = MissingPaymentsRequest {
            transactions: payments,
        };
        let ack: SaveAck = self.post(routes::SAVE_MISSING_PAYMENTS, &request).await?.json()?;

        Ok(ack.success)
    }

    /// Store a beverage report.
    pub async fn save_beverage_report(&self, report: &BeverageReport) -> Result<(), Error> {
        self.post(routes::SAVE_BEVERAGE_REPORT, report).await.map(|_| ())
    }

    /// Submit a reimbursement request.
    pub async fn submit_reimbursement(&self, request: &ReimbursementRequest) -> Result<(), Error> {
        self.post(routes::SUBMIT_REIMBURSEMENT, request).await.map(|_| ())
    }

    /// Ask the backend to e-mail the account report to `email`.
    pub async fn send_report(&self, email: &str) -> Result<(), Error> {
        self.post(routes::SEND_REPORT, &ReportRequest { email })
            .await
            .map(|_| ())
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<BackendResponse, Error> {
        let body = serde_json::to_value(body)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        self.send(Method::Post, path.to_owned(), Some(body))
            .await?
            .error_for_status()
    }

    async fn send(
        &self,
        method: Method,
        path: String,
        body: Option<serde_json::Value>,
    ) -> Result<BackendResponse, Error> {
        self.transport
            .send(BackendRequest { method, path, body })
            .await
    }
}
