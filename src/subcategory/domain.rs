//! Core subcategory types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::reference::{EntityId, EntityName};

/// A subdivision of a category, e.g. "Avito" under "Marketing".
///
/// Names are unique within a category, so the same name may appear under
/// different categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct SubCategory {
    pub id: EntityId,
    pub name: EntityName,
    pub category_id: EntityId,
    /// The name of the parent category, loaded alongside the subcategory for display.
    pub category_name: String,
}

impl Display for SubCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.category_name)
    }
}

/// Form data for subcategory creation and editing.
///
/// The category is kept as text so that a missing or invalid selection can
/// be reported next to the field.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SubCategoryFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
}

/// A subcategory as returned by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryOption {
    pub id: EntityId,
    pub name: String,
}

impl From<SubCategory> for SubcategoryOption {
    fn from(subcategory: SubCategory) -> Self {
        Self {
            id: subcategory.id,
            name: subcategory.name.to_string(),
        }
    }
}
