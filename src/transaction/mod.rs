//! Cash-flow transactions: dated money movements classified by status,
//! type, category and subcategory.
//!
//! This module contains:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, filtering and paging transactions
//! - The list page and the create, edit and delete handlers

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
pub(crate) mod filters;
pub(crate) mod form;
mod query;
mod transactions_page;

pub use core::{Transaction, TransactionBuilder, create_transaction, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub(crate) use core::get_transaction;
