//! Statuses, transaction types and categories: the named reference rows
//! that classify transactions.
//!
//! The three kinds share one implementation, parameterised by a
//! [ReferenceKind] marker type.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;

pub use create::{create_reference_endpoint, get_new_reference_page};
pub(crate) use db::map_unique_violation;
pub use db::{
    count_transactions_per_reference, create_reference, create_reference_table,
    delete_reference, get_all_references, get_reference, update_reference,
};
pub use delete::delete_reference_endpoint;
pub use domain::{
    CategoryKind, EntityId, EntityName, MAX_NAME_LENGTH, NamedEntity, ReferenceKind, StatusKind,
    TransactionTypeKind,
};
pub use edit::{get_edit_reference_page, update_reference_endpoint};
pub(crate) use form::{FormAction, INVALID_CHOICE_MESSAGE, REQUIRED_MESSAGE, parse_choice};
pub use list::get_reference_list_page;
