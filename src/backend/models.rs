//! The JSON bodies exchanged with the backend API.

use serde::{Deserialize, Serialize};

/// A transaction as listed by `GET /admin/get_transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Missing for entries the backend could not identify.
    #[serde(default)]
    pub id: Option<i64>,
    /// The booking date as sent by the backend.
    pub date: String,
    /// Positive for credits, negative for debits.
    pub amount: f64,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

/// The body of `POST /admin/add_transaction`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    /// The member's e-mail address.
    pub email: String,
    /// ISO date.
    pub date: String,
    /// The amount in euros.
    pub amount: f64,
    /// The generated or custom description.
    pub description: String,
}

/// The body of `POST /admin/update_member_status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStatusUpdate {
    /// The member's e-mail address.
    pub email: String,
    /// One of the membership titles, e.g. "CB".
    pub title: String,
    /// Whether the member lives in the house.
    pub is_resident: bool,
}

/// One row of `POST /admin/save_missing_payments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingPayment {
    /// The member's e-mail address.
    pub email: String,
    /// The first day of the month the payment is for, as an ISO date.
    pub date: String,
    /// The chosen amount, as shown in the amount selection.
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MissingPaymentsRequest<'a> {
    pub transactions: &'a [MissingPayment],
}

/// The answer to `POST /admin/save_missing_payments`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SaveAck {
    /// Whether the backend stored the payments.
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportRequest<'a> {
    pub email: &'a str,
}

/// How a member wants to be reimbursed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundType {
    /// Credited to the member's club account.
    #[default]
    Cc,
    /// Paid to a bank account.
    Bank,
}

/// One expense of a reimbursement request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReimbursementItem {
    /// What the money was spent on.
    pub description: String,
    /// ISO date of the expense.
    pub date: String,
    /// The amount in euros.
    pub amount: f64,
    /// The name of the attached receipt.
    pub receipt: String,
}

/// The body of `POST /submit_reimbursement`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReimbursementRequest {
    /// The requesting member's e-mail address.
    pub email: String,
    /// How the money should be paid out.
    pub refund_type: RefundType,
    /// Only set for bank refunds.
    pub bank_name: Option<String>,
    /// Only set for bank refunds.
    pub iban: Option<String>,
    /// The complete expense rows.
    pub items: Vec<ReimbursementItem>,
}

/// The price of one beverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeveragePrice {
    /// The beverage's display name.
    pub name: String,
    /// The price per unit in euros.
    pub price: f64,
}

/// One consumption entry of a beverage report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeverageEntry {
    /// Whether the beverages were consumed at an event rather than by a member.
    pub is_event: bool,
    /// The member's e-mail address, for individual entries.
    pub email: Option<String>,
    /// The event's title, for event entries.
    pub event_title: Option<String>,
    /// The beverage's name.
    pub beverage_name: String,
    /// How many units were consumed, always positive.
    pub count: i64,
}

/// The body of `POST /admin/save_beverage_report`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeverageReport {
    /// ISO date of the report.
    pub report_date: String,
    /// The prices the report was calculated with.
    pub prices: Vec<BeveragePrice>,
    /// Individual and event entries.
    pub entries: Vec<BeverageEntry>,
}
