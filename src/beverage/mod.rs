//! Beverage reports: what every member and every event drank, valued with
//! the configured prices.

mod form;
mod page;
mod prices;
mod tally;

pub use form::BeverageForm;
pub use page::{
    add_event_row, get_beverages_page, remove_event_row, submit_beverage_report, update_event_field,
    update_tally,
};
pub use prices::{PriceTable, PricedQuantities};
pub use tally::GroupedTally;
