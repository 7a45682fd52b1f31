//! Viewing, deleting and adding the transactions of a member.

mod description;
mod page;

pub use description::{DescriptionInputs, TransactionKind, build_description};
pub use page::{
    AddTransactionForm, add_transaction, delete_transaction, get_description_builder,
    get_transactions_page, get_transactions_table,
};
