//! Reimbursement requests: members list their expenses with receipts and
//! choose how the money is paid out.

mod form;
mod page;

pub use form::{ReimbursementForm, ReimbursementSubmission};
pub use page::{
    RECEIPT_UPLOAD_LIMIT, add_expense_row, get_bank_details, get_reimbursement_page,
    remove_expense_row, submit_reimbursement, update_expense_field, upload_receipt,
};
