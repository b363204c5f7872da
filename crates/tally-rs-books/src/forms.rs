//! The billing forms.
//!
//! Builder functions for the forms of the billing app: one document form
//! and one line-item form per document type, plus the organization,
//! tax-rate, and payment forms. The three document types share their
//! construction paths; the per-type entry points pin down the model and,
//! for line forms, the instance type.

use std::collections::HashMap;

use tally_rs_core::{TallyError, TallyResult};
use tally_rs_forms::fields::{set_choices, FormFieldDef};
use tally_rs_forms::form::BaseForm;
use tally_rs_forms::model_form::{generate_form_fields, ModelFormConfig, ModelFormFields};
use tally_rs_models::meta::Model;
use tally_rs_models::validators::{MaxValueValidator, MinValueValidator};
use tally_rs_models::value::Value;
use tally_rs_people::directory::UserDirectory;
use tally_rs_people::forms::user_multiple_choice_field;

use crate::client_field::ClientChoices;
use crate::models::{
    BillLine, DocumentKind, DocumentLine, EstimateLine, InvoiceLine, Organization, Payment,
    TaxRate,
};
use crate::store::BooksStore;

/// The editable fields of a billing document.
pub const DOCUMENT_FIELDS: &[&str] = &[
    "number",
    "client",
    "draft",
    "sent",
    "paid",
    "date_issued",
    "date_dued",
];

/// The editable fields of a line item.
pub const LINE_FIELDS: &[&str] = &[
    "label",
    "description",
    "unit_price_excl_tax",
    "quantity",
    "tax_rate",
];

fn include(names: &[&str]) -> ModelFormFields {
    ModelFormFields::Include(names.iter().map(ToString::to_string).collect())
}

// ── Document forms ─────────────────────────────────────────────────────

/// Builds a billing-document form: the editable whitelist plus the
/// tenant-scoped client selector.
///
/// The issue date is pre-filled with today.
pub async fn document_form(
    kind: DocumentKind,
    client_field: &mut ClientChoices,
) -> TallyResult<BaseForm> {
    let config = ModelFormConfig::new(kind.meta()).with_fields(include(DOCUMENT_FIELDS));
    let mut fields = generate_form_fields(&config);

    let client = client_field.as_field().await?;
    if let Some(slot) = fields.iter_mut().find(|f| f.name == "client") {
        *slot = client;
    }

    let initial = HashMap::from([(
        "date_issued".to_string(),
        Value::Date(chrono::Local::now().date_naive()),
    )]);
    Ok(BaseForm::new(fields).with_initial(initial))
}

/// Builds the estimate form.
pub async fn estimate_form(client_field: &mut ClientChoices) -> TallyResult<BaseForm> {
    document_form(DocumentKind::Estimate, client_field).await
}

/// Builds the invoice form.
pub async fn invoice_form(client_field: &mut ClientChoices) -> TallyResult<BaseForm> {
    document_form(DocumentKind::Invoice, client_field).await
}

/// Builds the bill form.
pub async fn bill_form(client_field: &mut ClientChoices) -> TallyResult<BaseForm> {
    document_form(DocumentKind::Bill, client_field).await
}

// ── Line forms ─────────────────────────────────────────────────────────

/// Returns the tax rates an existing line may select: the rates of the
/// organization owning the line's parent document.
///
/// Only invoice and bill lines know their way back to an organization;
/// any other line type is refused with [`TallyError::Unsupported`].
pub async fn restrict_to_organization(
    store: &dyn BooksStore,
    line: &DocumentLine,
) -> TallyResult<Vec<TaxRate>> {
    let organization = match line {
        DocumentLine::Invoice(l) => store.invoice(l.invoice).await?.map(|d| d.organization),
        DocumentLine::Bill(l) => store.bill(l.bill).await?.map(|d| d.organization),
        DocumentLine::Estimate(_) => {
            return Err(TallyError::Unsupported(line.meta().label()));
        }
    };
    let Some(organization) = organization else {
        return Err(TallyError::DoesNotExist(line.kind().name().to_string()));
    };
    store.tax_rates_for_organization(organization).await
}

/// Builds `(value, label)` choice pairs for stored tax rates.
///
/// Unstored rates (no primary key) are skipped.
pub fn tax_rate_choices(rates: &[TaxRate]) -> Vec<(String, String)> {
    rates
        .iter()
        .filter_map(|t| t.pk.map(|pk| (pk.to_string(), t.name.clone())))
        .collect()
}

/// The initial form data of an existing line.
pub fn line_initial(line: &DocumentLine) -> HashMap<String, Value> {
    HashMap::from([
        ("label".to_string(), Value::String(line.label().to_string())),
        (
            "description".to_string(),
            Value::String(line.description().to_string()),
        ),
        (
            "unit_price_excl_tax".to_string(),
            Value::Float(line.unit_price_excl_tax()),
        ),
        ("quantity".to_string(), Value::Float(line.quantity())),
        ("tax_rate".to_string(), Value::Int(line.tax_rate())),
    ])
}

pub(crate) fn generate_line_fields(kind: DocumentKind) -> Vec<FormFieldDef> {
    let config = ModelFormConfig::new(kind.line_meta()).with_fields(include(LINE_FIELDS));
    generate_form_fields(&config)
}

/// Builds a line-item form for the given document type.
///
/// With an existing line, the tax-rate choices narrow to the owning
/// organization's rates and the line's values become the form's initial
/// data. A blank line form offers every known rate; the narrowing only
/// applies once the line has been stored.
pub async fn line_form(
    kind: DocumentKind,
    store: &dyn BooksStore,
    instance: Option<&DocumentLine>,
) -> TallyResult<BaseForm> {
    let mut fields = generate_line_fields(kind);

    let rates = match instance {
        Some(line) => restrict_to_organization(store, line).await?,
        None => store.tax_rates().await?,
    };
    if let Some(field) = fields.iter_mut().find(|f| f.name == "tax_rate") {
        set_choices(field, tax_rate_choices(&rates));
    }

    let mut form = BaseForm::new(fields);
    if let Some(line) = instance {
        form = form.with_initial(line_initial(line));
    }
    Ok(form)
}

/// Builds the estimate-line form.
///
/// Estimate lines cannot be walked back to an organization, so building
/// this form over an existing line fails with the unsupported-model error.
pub async fn estimate_line_form(
    store: &dyn BooksStore,
    instance: Option<&EstimateLine>,
) -> TallyResult<BaseForm> {
    let line = instance.cloned().map(DocumentLine::Estimate);
    line_form(DocumentKind::Estimate, store, line.as_ref()).await
}

/// Builds the invoice-line form.
pub async fn invoice_line_form(
    store: &dyn BooksStore,
    instance: Option<&InvoiceLine>,
) -> TallyResult<BaseForm> {
    let line = instance.cloned().map(DocumentLine::Invoice);
    line_form(DocumentKind::Invoice, store, line.as_ref()).await
}

/// Builds the bill-line form.
pub async fn bill_line_form(
    store: &dyn BooksStore,
    instance: Option<&BillLine>,
) -> TallyResult<BaseForm> {
    let line = instance.cloned().map(DocumentLine::Bill);
    line_form(DocumentKind::Bill, store, line.as_ref()).await
}

// ── Auxiliary forms ────────────────────────────────────────────────────

/// Builds the organization settings form.
///
/// Membership is picked through a multiple-user autocomplete selector and
/// is optional.
pub async fn organization_form(directory: &dyn UserDirectory) -> TallyResult<BaseForm> {
    let config = ModelFormConfig::new(Organization::meta())
        .with_fields(include(&["display_name", "legal_name", "members"]));
    let mut fields = generate_form_fields(&config);

    let members = user_multiple_choice_field(directory, "members")
        .await?
        .required(false);
    if let Some(slot) = fields.iter_mut().find(|f| f.name == "members") {
        *slot = members;
    }
    Ok(BaseForm::new(fields))
}

/// Builds the tax-rate form. The rate is a fraction bounded to [0, 1].
pub fn tax_rate_form() -> BaseForm {
    let config = ModelFormConfig::new(TaxRate::meta()).with_fields(include(&["name", "rate"]));
    let mut fields = generate_form_fields(&config);
    if let Some(rate) = fields.iter_mut().find(|f| f.name == "rate") {
        rate.validators.push(Box::new(MinValueValidator::new(0.0)));
        rate.validators.push(Box::new(MaxValueValidator::new(1.0)));
    }
    BaseForm::new(fields)
}

/// Builds the payment capture form. The payment date is pre-filled with
/// today.
pub fn payment_form() -> BaseForm {
    let config = ModelFormConfig::new(Payment::meta())
        .with_fields(include(&["amount", "reference", "detail", "date_paid"]));
    let fields = generate_form_fields(&config);
    let initial = HashMap::from([(
        "date_paid".to_string(),
        Value::Date(chrono::Local::now().date_naive()),
    )]);
    BaseForm::new(fields).with_initial(initial)
}
