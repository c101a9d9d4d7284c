//! The subcategory form shared by the create and edit pages.

use maud::{Markup, html};

use crate::{
    Error,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, choice_options, field_error, submit_button},
    reference::{
        EntityId, EntityName, FormAction, INVALID_CHOICE_MESSAGE, NamedEntity, parse_choice,
    },
    subcategory::domain::SubCategoryFormData,
};

/// Field level errors of the subcategory form.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubCategoryFormErrors {
    pub name: Option<String>,
    pub category: Option<String>,
}

impl SubCategoryFormErrors {
    /// Attach a database error to the field it concerns.
    ///
    /// Returns the error back if it does not belong to a field.
    pub fn from_db_error(error: Error) -> Result<Self, Error> {
        match error {
            Error::DuplicateName(..) => Ok(Self {
                name: Some(format!("{error}.")),
                category: None,
            }),
            Error::InvalidReference(_) => Ok(Self {
                name: None,
                category: Some(INVALID_CHOICE_MESSAGE.to_owned()),
            }),
            error => Err(error),
        }
    }
}

/// Validate the submitted form against the categories that were offered.
///
/// # Errors
/// Returns the message for every invalid field.
pub fn validate_subcategory_form(
    form: &SubCategoryFormData,
    categories: &[NamedEntity],
) -> Result<(EntityName, EntityId), SubCategoryFormErrors> {
    let category_ids = categories.iter().map(|category| category.id).collect::<Vec<_>>();

    let name = EntityName::new(&form.name).map_err(|error| error.to_string());
    let category_id = parse_choice(&form.category, &category_ids).map_err(str::to_owned);

    match (name, category_id) {
        (Ok(name), Ok(category_id)) => Ok((name, category_id)),
        (name, category_id) => Err(SubCategoryFormErrors {
            name: name.err(),
            category: category_id.err(),
        }),
    }
}

/// The form for a subcategory's name and category.
pub fn subcategory_form_view(
    action: FormAction<'_>,
    form: &SubCategoryFormData,
    categories: &[NamedEntity],
    errors: &SubCategoryFormErrors,
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        FormAction::Create(endpoint) => (Some(endpoint), None, "Create Subcategory"),
        FormAction::Update(endpoint) => (None, Some(endpoint), "Update Subcategory"),
    };
    let category_choices = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()));

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Subcategory"
                    value=(form.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.name.as_deref()))
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    (choice_options(category_choices, &form.category))
                }

                (field_error(errors.category.as_deref()))
            }

            (submit_button(button_text))
        }
    }
}
