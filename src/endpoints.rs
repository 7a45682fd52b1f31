//! The endpoint URIs served by the app.
//!
//! For endpoints that take parameters, e.g., '/reimbursement/{form_id}/rows', use [format_endpoint].

/// The root route which redirects to the reimbursement page.
pub const ROOT: &str = "/";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The reimbursement request page.
pub const REIMBURSEMENT_VIEW: &str = "/reimbursement";
/// Shows or hides the bank details depending on the refund type.
pub const REIMBURSEMENT_BANK_DETAILS: &str = "/reimbursement/bank_details";
/// Appends an expense row.
pub const REIMBURSEMENT_ROWS: &str = "/reimbursement/{form_id}/rows";
/// Edits (PUT) or removes (DELETE) an expense row.
pub const REIMBURSEMENT_ROW: &str = "/reimbursement/{form_id}/rows/{row_id}";
/// Attaches a receipt to an expense row.
pub const REIMBURSEMENT_RECEIPT: &str = "/reimbursement/{form_id}/rows/{row_id}/receipt";
/// Submits the reimbursement request.
pub const REIMBURSEMENT_SUBMIT: &str = "/reimbursement/{form_id}/submit";

/// The beverage report page.
pub const BEVERAGES_VIEW: &str = "/beverages";
/// Edits one member's count of one beverage.
pub const BEVERAGE_TALLY: &str = "/beverages/{form_id}/tally";
/// Appends an event row.
pub const BEVERAGE_EVENTS: &str = "/beverages/{form_id}/events";
/// Edits (PUT) or removes (DELETE) an event row.
pub const BEVERAGE_EVENT: &str = "/beverages/{form_id}/events/{row_id}";
/// Submits the beverage report.
pub const BEVERAGE_SUBMIT: &str = "/beverages/{form_id}/submit";

/// The page listing unpaid monthly contributions.
pub const MISSING_PAYMENTS_VIEW: &str = "/admin/missing_payments";
/// Changes the amount of a missing payment.
pub const MISSING_PAYMENT: &str = "/admin/missing_payments/{form_id}/rows/{row_id}";
/// Selects or deselects a missing payment.
pub const MISSING_PAYMENT_TOGGLE: &str = "/admin/missing_payments/{form_id}/rows/{row_id}/toggle";
/// Books the selected missing payments.
pub const MISSING_PAYMENTS_SUBMIT: &str = "/admin/missing_payments/{form_id}/submit";

/// The page for booking fines decided in a meeting.
pub const FINES_VIEW: &str = "/admin/fines";
/// Appends a fine row.
pub const FINE_ROWS: &str = "/admin/fines/{form_id}/rows";
/// Edits (PUT) or removes (DELETE) a fine row.
pub const FINE_ROW: &str = "/admin/fines/{form_id}/rows/{row_id}";
/// Books the complete fines.
pub const FINES_SUBMIT: &str = "/admin/fines/{form_id}/submit";

/// The page for listing and adding a member's transactions.
pub const TRANSACTIONS_VIEW: &str = "/admin/transactions";
/// The transaction table of one member.
pub const TRANSACTIONS_TABLE: &str = "/admin/transactions/table";
/// The description generated for a new transaction.
pub const TRANSACTION_DESCRIPTION: &str = "/admin/transactions/description";
/// Deletes a transaction.
pub const DELETE_TRANSACTION: &str = "/admin/transactions/{transaction_id}";

/// The page for editing member titles and residency.
pub const MEMBERS_VIEW: &str = "/admin/members";
/// Compares a member's edited status with the saved one.
pub const MEMBER_CHANGES: &str = "/admin/members/changes";
/// Saves a member's status.
pub const MEMBER_STATUS: &str = "/admin/members/status";
/// E-mails a member their account report.
pub const SEND_REPORT: &str = "/admin/members/send_report";

/// Replace the parameters in `endpoint_path` with `ids`, in order.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/forms/{form_id}', '{form_id}' is the parameter.
///
/// Parameters without a matching ID are left in place, surplus IDs are ignored.
pub fn format_endpoint(endpoint_path: &str, ids: &[u64]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut rest = endpoint_path;
    let mut ids = ids.iter();

    while let Some(param_start) = rest.find('{') {
        let Some(param_len) = rest[param_start..].find('}') else {
            break;
        };
        let Some(id) = ids.next() else {
            break;
        };

        formatted.push_str(&rest[..param_start]);
        formatted.push_str(&id.to_string());
        rest = &rest[param_start + param_len + 1..];
    }

    formatted.push_str(rest);
    formatted
}
