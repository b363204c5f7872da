//! Model-backed forms that auto-generate fields from model metadata.
//!
//! [`ModelFormConfig`] specifies how to generate form fields from a model's
//! [`ModelMeta`](tally_rs_models::meta::ModelMeta). The
//! [`generate_form_fields`] function creates [`FormFieldDef`] instances from
//! the model's [`FieldDef`](tally_rs_models::fields::FieldDef) entries.
//!
//! Relational fields (foreign keys, many-to-many) are skipped when
//! generating all fields, but honored when a whitelist names them: a
//! foreign key becomes a typed choice coercing to an integer primary key
//! and a many-to-many becomes a multiple choice. The choice lists start
//! empty; callers inject the runtime pairs with
//! [`set_choices`](crate::fields::set_choices) once the valid option set
//! is known (typically after scoping to an organization).

use std::collections::HashMap;

use tally_rs_models::fields::{FieldDef, FieldType};
use tally_rs_models::meta::ModelMeta;

use crate::fields::{coerce_int, FormFieldDef, FormFieldType};
use crate::widgets::WidgetType;

/// Configuration for generating a model-backed form.
///
/// Specifies which model fields to include/exclude and allows overriding
/// widgets, labels, and help texts for the generated form fields.
pub struct ModelFormConfig {
    /// The model metadata to generate fields from.
    pub model_meta: &'static ModelMeta,
    /// Which model fields to include in the form.
    pub fields: ModelFormFields,
    /// Widget overrides keyed by field name.
    pub widgets: HashMap<String, WidgetType>,
    /// Label overrides keyed by field name.
    pub labels: HashMap<String, String>,
    /// Help text overrides keyed by field name.
    pub help_texts: HashMap<String, String>,
}

/// Specifies which model fields to include in a model form.
#[derive(Debug, Clone)]
pub enum ModelFormFields {
    /// Include all editable non-relational fields.
    All,
    /// Include only the named fields, in the order given.
    Include(Vec<String>),
    /// Include all editable non-relational fields except the named ones.
    Exclude(Vec<String>),
}

impl ModelFormConfig {
    /// Creates a new `ModelFormConfig` with all fields included.
    pub fn new(model_meta: &'static ModelMeta) -> Self {
        Self {
            model_meta,
            fields: ModelFormFields::All,
            widgets: HashMap::new(),
            labels: HashMap::new(),
            help_texts: HashMap::new(),
        }
    }

    /// Sets which fields to include.
    #[must_use]
    pub fn with_fields(mut self, fields: ModelFormFields) -> Self {
        self.fields = fields;
        self
    }

    /// Adds a widget override for a specific field.
    #[must_use]
    pub fn with_widget(mut self, field_name: impl Into<String>, widget: WidgetType) -> Self {
        self.widgets.insert(field_name.into(), widget);
        self
    }

    /// Adds a label override for a specific field.
    #[must_use]
    pub fn with_label(mut self, field_name: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field_name.into(), label.into());
        self
    }

    /// Adds a help text override for a specific field.
    #[must_use]
    pub fn with_help_text(
        mut self,
        field_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.help_texts.insert(field_name.into(), text.into());
        self
    }
}

/// Generates form field definitions from a model form configuration.
///
/// Primary keys and non-editable fields never appear. Under
/// [`ModelFormFields::All`] and [`ModelFormFields::Exclude`] relational
/// fields are skipped as well; an [`ModelFormFields::Include`] whitelist
/// honors them and preserves its declared order. Whitelist names that do
/// not match a model field are ignored.
pub fn generate_form_fields(config: &ModelFormConfig) -> Vec<FormFieldDef> {
    match &config.fields {
        ModelFormFields::Include(include) => include
            .iter()
            .filter_map(|name| config.model_meta.get_field(name))
            .filter_map(|model_field| build_form_field(config, model_field, true))
            .collect(),
        ModelFormFields::All => config
            .model_meta
            .fields
            .iter()
            .filter_map(|model_field| build_form_field(config, model_field, false))
            .collect(),
        ModelFormFields::Exclude(exclude) => config
            .model_meta
            .fields
            .iter()
            .filter(|model_field| !exclude.iter().any(|e| e == model_field.name))
            .filter_map(|model_field| build_form_field(config, model_field, false))
            .collect(),
    }
}

/// Builds a single form field from a model field, applying config overrides.
fn build_form_field(
    config: &ModelFormConfig,
    model_field: &FieldDef,
    include_relations: bool,
) -> Option<FormFieldDef> {
    if !model_field.editable || model_field.primary_key {
        return None;
    }
    if model_field.is_relation() && !include_relations {
        return None;
    }

    let field_name = model_field.name.to_string();
    let form_field_type = model_field_to_form_field_type(model_field);
    let mut form_field = FormFieldDef::new(&field_name, form_field_type);

    form_field.required = model_field.required_for_forms();

    // Long-text columns render as textareas
    if matches!(model_field.field_type, FieldType::TextField) {
        form_field.widget = WidgetType::Textarea;
    }

    // Apply overrides
    if let Some(widget) = config.widgets.get(&field_name) {
        form_field.widget = widget.clone();
    }
    if let Some(label) = config.labels.get(&field_name) {
        form_field.label = label.clone();
    } else if let Some(verbose_name) = &model_field.verbose_name {
        form_field.label = verbose_name.clone();
    }
    if let Some(help_text) = config.help_texts.get(&field_name) {
        form_field.help_text = help_text.clone();
    } else if let Some(help_text) = &model_field.help_text {
        form_field.help_text = help_text.clone();
    }

    // Set initial from the model default
    if let Some(default) = &model_field.default {
        form_field.initial = Some(default.clone());
    }

    Some(form_field)
}

/// Converts a model field type to a form field type.
fn model_field_to_form_field_type(field_def: &FieldDef) -> FormFieldType {
    match &field_def.field_type {
        FieldType::CharField | FieldType::TextField => FormFieldType::Char {
            min_length: None,
            max_length: field_def.max_length.and_then(|n| usize::try_from(n).ok()),
            strip: true,
        },
        FieldType::IntegerField => FormFieldType::Integer {
            min_value: None,
            max_value: None,
        },
        FieldType::DecimalField {
            max_digits,
            decimal_places,
        } => FormFieldType::Decimal {
            max_digits: u32::from(*max_digits),
            decimal_places: u32::from(*decimal_places),
        },
        FieldType::BooleanField => FormFieldType::Boolean,
        FieldType::DateField => FormFieldType::Date,
        // Auto fields are excluded by the primary-key check, but handle
        // gracefully
        FieldType::BigAutoField => FormFieldType::Integer {
            min_value: None,
            max_value: None,
        },
        // Relations become choice fields; callers inject the runtime choices
        FieldType::ForeignKey { .. } => FormFieldType::TypedChoice {
            choices: Vec::new(),
            coerce: coerce_int,
        },
        FieldType::ManyToManyField { .. } => FormFieldType::MultipleChoice {
            choices: Vec::new(),
        },
    }
}
