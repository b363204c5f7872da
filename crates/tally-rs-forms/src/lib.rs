//! Form handling for tally-rs: data binding, validation, and rendering.
//!
//! This crate provides the form layer of the framework:
//!
//! - [`data`]: [`FormData`], the parsed urlencoded submission payload
//! - [`fields`]: form field definitions and type-level cleaning
//! - [`widgets`]: HTML widget rendering, including autocomplete selects
//! - [`form`]: the async [`Form`] trait and [`BaseForm`]
//! - [`bound_field`]: per-field rendering state
//! - [`formset`]: [`FormSet`] for repeated rows with management data
//! - [`model_form`]: form field generation from model metadata
//! - [`validation`]: the shared field-cleaning pipeline
//!
//! Forms bind against `{prefix}-{name}` HTML names, accumulate per-field
//! error lists, and expose cleaned data as typed
//! [`Value`](tally_rs_models::value::Value)s after a successful
//! `is_valid()` call.

// Validation errors carry structured context and ride inside TallyError
#![allow(clippy::result_large_err)]

pub mod bound_field;
pub mod data;
pub mod fields;
pub mod form;
pub mod formset;
pub mod model_form;
pub mod validation;
pub mod widgets;

pub use bound_field::{BoundField, BoundFieldDef};
pub use data::FormData;
pub use fields::{
    clean_field_value, coerce_int, field_has_changed, set_choices, FormFieldDef, FormFieldType,
};
pub use form::{BaseForm, Form};
pub use formset::{FormFactory, FormSet};
pub use model_form::{generate_form_fields, ModelFormConfig, ModelFormFields};
pub use validation::{clean_fields, full_clean};
pub use widgets::{
    create_widget, create_widget_with_choices, Widget, WidgetType,
    DEFAULT_AUTOCOMPLETE_PAGE_SIZE,
};
