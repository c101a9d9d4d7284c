//! Subcategories: named subdivisions of a category.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod lookup;

pub use create::{create_subcategory_endpoint, get_new_subcategory_page};
pub use db::{
    count_subcategories_per_category, count_transactions_per_subcategory, create_subcategory,
    create_subcategory_table, get_all_subcategories, get_subcategories_for_category,
};
pub use delete::delete_subcategory_endpoint;
pub use domain::{SubCategory, SubcategoryOption};
pub use edit::{get_edit_subcategory_page, update_subcategory_endpoint};
pub use list::get_subcategory_list_page;
pub use lookup::{get_subcategories_json, get_subcategory_options, subcategory_options_view};

#[cfg(test)]
pub(crate) use db::get_subcategory;
