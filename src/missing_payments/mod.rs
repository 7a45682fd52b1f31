//! Missing monthly contributions: every month a paying member has not been
//! charged for, offered for booking one selection at a time.

mod form;
mod page;

pub use form::{DueMonth, MemberDues, MissingPaymentsForm, is_contribution, missing_months};
pub use page::{
    get_missing_payments_page, submit_missing_payments, toggle_payment, update_payment_amount,
};
