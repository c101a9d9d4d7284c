//! Core types shared by statuses, transaction types and categories.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, endpoints};

/// The maximum number of characters in a name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Database identifier for statuses, types, categories and subcategories.
pub type EntityId = i64;

/// A validated name for a status, type, category or subcategory.
///
/// Names are trimmed, must not be empty and are at most [MAX_NAME_LENGTH]
/// characters long.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct EntityName(String);

impl EntityName {
    /// Create a name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is empty or
    /// just whitespace, and [Error::NameTooLong] if it has more than
    /// [MAX_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Err(Error::NameTooLong)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a name without validation.
    ///
    /// The caller should ensure that the string is trimmed, not empty and not too long.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntityName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityName::new(s)
    }
}

impl Display for EntityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A status, transaction type or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct NamedEntity {
    pub id: EntityId,
    pub name: EntityName,
}

/// Form data for creating and editing statuses, types and categories.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReferenceFormData {
    #[serde(default)]
    pub name: String,
}

/// Describes one kind of named reference row: where it is stored, which
/// transaction column points at it and where its pages live.
///
/// Statuses, transaction types and categories only differ in these
/// constants, so their pages and queries are written once over this trait.
pub trait ReferenceKind: Send + Sync + 'static {
    /// The database table, e.g. "status".
    const TABLE: &'static str;
    /// The column of the transaction table that refers to this table.
    const TRANSACTION_COLUMN: &'static str;
    /// The lowercase noun used in messages, e.g. "transaction type".
    const NOUN: &'static str;
    /// The capitalised singular used in titles, e.g. "Transaction Type".
    const SINGULAR: &'static str;
    /// The capitalised plural used in titles, e.g. "Transaction Types".
    const PLURAL: &'static str;
    /// The list page.
    const LIST_VIEW: &'static str;
    /// The create page.
    const NEW_VIEW: &'static str;
    /// The edit page, with an `{id}` parameter.
    const EDIT_VIEW: &'static str;
    /// The create endpoint.
    const COLLECTION_API: &'static str;
    /// The update and delete endpoint, with an `{id}` parameter.
    const ITEM_API: &'static str;
    /// Whether subcategories belong to rows of this kind.
    const HAS_SUBCATEGORIES: bool = false;
}

/// The settlement status of a transaction, e.g. "Business" or "Personal".
pub struct StatusKind;

impl ReferenceKind for StatusKind {
    const TABLE: &'static str = "status";
    const TRANSACTION_COLUMN: &'static str = "status_id";
    const NOUN: &'static str = "status";
    const SINGULAR: &'static str = "Status";
    const PLURAL: &'static str = "Statuses";
    const LIST_VIEW: &'static str = endpoints::STATUSES_VIEW;
    const NEW_VIEW: &'static str = endpoints::NEW_STATUS_VIEW;
    const EDIT_VIEW: &'static str = endpoints::EDIT_STATUS_VIEW;
    const COLLECTION_API: &'static str = endpoints::POST_STATUS;
    const ITEM_API: &'static str = endpoints::STATUS;
}

/// The direction of a transaction, e.g. "Income" or "Expense".
pub struct TransactionTypeKind;

impl ReferenceKind for TransactionTypeKind {
    const TABLE: &'static str = "transaction_type";
    const TRANSACTION_COLUMN: &'static str = "type_id";
    const NOUN: &'static str = "transaction type";
    const SINGULAR: &'static str = "Transaction Type";
    const PLURAL: &'static str = "Transaction Types";
    const LIST_VIEW: &'static str = endpoints::TYPES_VIEW;
    const NEW_VIEW: &'static str = endpoints::NEW_TYPE_VIEW;
    const EDIT_VIEW: &'static str = endpoints::EDIT_TYPE_VIEW;
    const COLLECTION_API: &'static str = endpoints::POST_TYPE;
    const ITEM_API: &'static str = endpoints::TYPE;
}

/// What the money was spent on or received for, e.g. "Marketing".
pub struct CategoryKind;

impl ReferenceKind for CategoryKind {
    const TABLE: &'static str = "category";
    const TRANSACTION_COLUMN: &'static str = "category_id";
    const NOUN: &'static str = "category";
    const SINGULAR: &'static str = "Category";
    const PLURAL: &'static str = "Categories";
    const LIST_VIEW: &'static str = endpoints::CATEGORIES_VIEW;
    const NEW_VIEW: &'static str = endpoints::NEW_CATEGORY_VIEW;
    const EDIT_VIEW: &'static str = endpoints::EDIT_CATEGORY_VIEW;
    const COLLECTION_API: &'static str = endpoints::POST_CATEGORY;
    const ITEM_API: &'static str = endpoints::CATEGORY;
    const HAS_SUBCATEGORIES: bool = true;
}
