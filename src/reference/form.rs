//! The name form shared by the create and edit pages.

use maud::{Markup, html};

use crate::{
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_error, submit_button},
    reference::{EntityId, MAX_NAME_LENGTH, ReferenceKind},
};

/// The error shown when a required field is left blank.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// The error shown when a select submits a value that is not one of its choices.
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Check the submitted value of a select against the IDs it offered.
///
/// # Errors
/// Returns [REQUIRED_MESSAGE] for a blank value and [INVALID_CHOICE_MESSAGE]
/// for anything that is not one of `choices`.
pub fn parse_choice(value: &str, choices: &[EntityId]) -> Result<EntityId, &'static str> {
    let value = value.trim();

    if value.is_empty() {
        return Err(REQUIRED_MESSAGE);
    }

    value
        .parse::<EntityId>()
        .ok()
        .filter(|id| choices.contains(id))
        .ok_or(INVALID_CHOICE_MESSAGE)
}

/// Whether the form creates a new row or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction<'a> {
    /// POST to the given endpoint.
    Create(&'a str),
    /// PUT to the given endpoint.
    Update(&'a str),
}

/// The form for the name of a row of kind `K`.
///
/// The form replaces itself with the response, so a rejected name comes
/// back as the same form with `error_message` under the field.
pub fn reference_form_view<K: ReferenceKind>(
    action: FormAction<'_>,
    name: &str,
    error_message: Option<&str>,
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        FormAction::Create(endpoint) => (Some(endpoint), None, format!("Create {}", K::SINGULAR)),
        FormAction::Update(endpoint) => (None, Some(endpoint), format!("Update {}", K::SINGULAR)),
    };

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
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder=(K::SINGULAR)
                    value=(name)
                    maxlength=(MAX_NAME_LENGTH)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(error_message))
            }

            (submit_button(&button_text))
        }
    }
}
