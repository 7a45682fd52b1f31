//! Fines decided in a meeting: one row per fine, booked as a charge on each
//! member's account.

mod form;
mod page;

pub use form::FineForm;
pub use page::{add_fine_row, get_fines_page, remove_fine_row, submit_fines, update_fine_field};
