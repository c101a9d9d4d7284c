//! The transaction form shared by the create and edit pages.
//!
//! The subcategory select only offers the subcategories of one category.
//! Which category that is depends on where the form comes from, see
//! [subcategory_choices].

use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, endpoints,
    amount::Amount,
    date_input::{format_display_date, parse_form_date},
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, choice_options, field_error, submit_button},
    reference::{
        CategoryKind, EntityId, FormAction, NamedEntity, REQUIRED_MESSAGE, StatusKind,
        TransactionTypeKind, get_all_references, parse_choice,
    },
    subcategory::{SubCategory, get_subcategories_for_category, subcategory_options_view},
    transaction::{Transaction, TransactionBuilder},
};

const INVALID_DATE_MESSAGE: &str = "Enter a valid date.";

/// The raw text of a submitted transaction form.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFormData {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub comment: String,
}

impl From<&Transaction> for TransactionFormData {
    fn from(transaction: &Transaction) -> Self {
        Self {
            created_at: format_display_date(transaction.created_at),
            status: transaction.status_id.to_string(),
            type_: transaction.type_id.to_string(),
            category: transaction.category_id.to_string(),
            subcategory: transaction.subcategory_id.to_string(),
            amount: transaction.amount.to_string(),
            comment: transaction.comment.clone(),
        }
    }
}

/// Field level errors of the transaction form.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TransactionFormErrors {
    pub created_at: Option<String>,
    pub status: Option<String>,
    pub type_: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub amount: Option<String>,
}

/// The options of the form's selects.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionFormChoices {
    pub statuses: Vec<NamedEntity>,
    pub types: Vec<NamedEntity>,
    pub categories: Vec<NamedEntity>,
    pub subcategories: Vec<SubCategory>,
}

impl TransactionFormChoices {
    /// Load the choices for a form, see [subcategory_choices] for the
    /// meaning of the arguments.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the choices cannot be loaded.
    pub fn load(
        stored_category: Option<EntityId>,
        submitted_category: Option<&str>,
        connection: &Connection,
    ) -> Result<Self, Error> {
        Ok(Self {
            statuses: get_all_references::<StatusKind>(connection)?,
            types: get_all_references::<TransactionTypeKind>(connection)?,
            categories: get_all_references::<CategoryKind>(connection)?,
            subcategories: subcategory_choices(stored_category, submitted_category, connection)?,
        })
    }
}

/// The subcategories the form offers.
///
/// `stored_category` is the category of the transaction being edited, and
/// `None` for a new transaction, which starts with no choices. A submitted
/// category that parses as an integer takes precedence over the stored one.
///
/// # Errors
/// Returns [Error::SqlError] if the subcategories cannot be loaded.
pub fn subcategory_choices(
    stored_category: Option<EntityId>,
    submitted_category: Option<&str>,
    connection: &Connection,
) -> Result<Vec<SubCategory>, Error> {
    let submitted_category =
        submitted_category.and_then(|category| category.trim().parse::<EntityId>().ok());

    match submitted_category.or(stored_category) {
        Some(category_id) => get_subcategories_for_category(category_id, connection),
        None => Ok(Vec::new()),
    }
}

/// Validate the submitted form against the choices that were offered.
///
/// A blank date gives a builder without a date.
///
/// # Errors
/// Returns the message for every invalid field.
pub fn validate_transaction_form(
    form: &TransactionFormData,
    choices: &TransactionFormChoices,
) -> Result<TransactionBuilder, TransactionFormErrors> {
    let ids = |entities: &[NamedEntity]| entities.iter().map(|entity| entity.id).collect::<Vec<_>>();
    let subcategory_ids = choices
        .subcategories
        .iter()
        .map(|subcategory| subcategory.id)
        .collect::<Vec<_>>();

    let created_at = parse_created_at(&form.created_at);
    let status = parse_choice(&form.status, &ids(&choices.statuses));
    let type_ = parse_choice(&form.type_, &ids(&choices.types));
    let category = parse_choice(&form.category, &ids(&choices.categories));
    let subcategory = parse_choice(&form.subcategory, &subcategory_ids);
    let amount = parse_amount(&form.amount);

    match (created_at, status, type_, category, subcategory, amount) {
        (Ok(created_at), Ok(status), Ok(type_), Ok(category), Ok(subcategory), Ok(amount)) => {
            Ok(
                Transaction::build(status, type_, category, subcategory, amount)
                    .created_at(created_at)
                    .comment(form.comment.trim()),
            )
        }
        (created_at, status, type_, category, subcategory, amount) => {
            Err(TransactionFormErrors {
                created_at: created_at.err(),
                status: status.err().map(str::to_owned),
                type_: type_.err().map(str::to_owned),
                category: category.err().map(str::to_owned),
                subcategory: subcategory.err().map(str::to_owned),
                amount: amount.err(),
            })
        }
    }
}

fn parse_created_at(text: &str) -> Result<Option<Date>, String> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    parse_form_date(text)
        .map(Some)
        .ok_or_else(|| INVALID_DATE_MESSAGE.to_owned())
}

fn parse_amount(text: &str) -> Result<Amount, String> {
    if text.trim().is_empty() {
        return Err(REQUIRED_MESSAGE.to_owned());
    }

    text.parse::<Amount>().map_err(|error| error.to_string())
}

fn named_choices(entities: &[NamedEntity]) -> impl Iterator<Item = (EntityId, &str)> {
    entities
        .iter()
        .map(|entity| (entity.id, entity.name.as_ref()))
}

/// The transaction form, grouped into main information and operation details.
pub fn transaction_form_view(
    action: FormAction<'_>,
    form: &TransactionFormData,
    choices: &TransactionFormChoices,
    errors: &TransactionFormErrors,
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        FormAction::Create(endpoint) => (Some(endpoint), None, "Create Transaction"),
        FormAction::Update(endpoint) => (None, Some(endpoint), "Update Transaction"),
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
            fieldset class="space-y-4"
            {
                legend class="text-lg font-semibold mb-2" { "Main information" }

                div
                {
                    label for="created_at" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="created_at"
                        type="text"
                        name="created_at"
                        placeholder="dd.mm.yyyy"
                        value=(form.created_at)
                        class=(FORM_TEXT_INPUT_STYLE);

                    (field_error(errors.created_at.as_deref()))
                }

                div
                {
                    label for="status" class=(FORM_LABEL_STYLE) { "Status" }

                    select id="status" name="status" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (choice_options(named_choices(&choices.statuses), &form.status))
                    }

                    (field_error(errors.status.as_deref()))
                }

                div
                {
                    label for="type" class=(FORM_LABEL_STYLE) { "Type" }

                    select id="type" name="type" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (choice_options(named_choices(&choices.types), &form.type_))
                    }

                    (field_error(errors.type_.as_deref()))
                }
            }

            fieldset class="space-y-4"
            {
                legend class="text-lg font-semibold mb-2" { "Operation details" }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    select
                        id="category"
                        name="category"
                        required
                        hx-get=(endpoints::SUBCATEGORY_OPTIONS)
                        hx-trigger="change"
                        hx-target="#subcategory"
                        hx-swap="innerHTML"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (choice_options(named_choices(&choices.categories), &form.category))
                    }

                    (field_error(errors.category.as_deref()))
                }

                div
                {
                    label for="subcategory" class=(FORM_LABEL_STYLE) { "Subcategory" }

                    select id="subcategory" name="subcategory" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (subcategory_options_view(&choices.subcategories, &form.subcategory))
                    }

                    (field_error(errors.subcategory.as_deref()))
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount, ₽" }

                    input
                        id="amount"
                        type="text"
                        inputmode="decimal"
                        name="amount"
                        placeholder="0.00"
                        value=(form.amount)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    (field_error(errors.amount.as_deref()))
                }

                div
                {
                    label for="comment" class=(FORM_LABEL_STYLE) { "Comment" }

                    textarea
                        id="comment"
                        name="comment"
                        rows="3"
                        cols="40"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (form.comment)
                    }
                }
            }

            (submit_button(button_text))
        }
    }
}
